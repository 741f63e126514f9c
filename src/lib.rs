//! Packs water molecules into geometric regions with an external packing
//! solver and writes the result as a simulation-ready LAMMPS data file.
//!
//! Regions are described by geometric primitives that turn a target mass
//! density into a molecule count and compile themselves into the solver's
//! declarative `structure ... end structure` instructions. A
//! [`PackSession`] collects them in order, runs the solver (by default
//! `packmol`) in a private scratch directory, and converts its raw output.
//!
//! # Quick Start
//!
//! ```no_run
//! use pack_water::{Geometry, GeometryOptions, PackOptions, PackSession};
//!
//! let mut session = PackSession::default();
//! session.append(Geometry::cube([0.0, 0.0, 0.0], 40.0, &GeometryOptions::number(10_000))?);
//!
//! // Pad the box by 2 Å so periodic images do not overlap.
//! let summary = session.pack("water_10000mol_PBC.out", &PackOptions::periodic(2.0))?;
//! assert_eq!(summary.atoms, 30_000);
//! # Ok::<(), pack_water::PackError>(())
//! ```
//!
//! Regions can also be carved: later geometries placed `out` exclude water
//! from part of an earlier one.
//!
//! ```
//! use pack_water::{Geometry, GeometryOptions, PackSession};
//!
//! let mut session = PackSession::default();
//! session
//!     .append(Geometry::cuboid([0.0; 3], [40.0; 3], &GeometryOptions::density(0.998))?)
//!     .append(Geometry::sphere([20.0; 3], 10.0, &GeometryOptions::number(0).with_side("out"))?);
//!
//! let mut script = Vec::new();
//! session.write_script(&mut script, "raw.xyz".as_ref(), 2.0)?;
//! let script = String::from_utf8(script).unwrap();
//! assert!(script.contains("  number 2135\n  inside box 0 0 0 40 40 40\n"));
//! assert!(script.contains("  outside sphere 20 20 20 10\n"));
//! # Ok::<(), pack_water::PackError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — Readers for raw solver output (XYZ, PDB) and the LAMMPS writer
//! - [`pack()`] — One-call packing with default settings
//!
//! # Data Types
//!
//! - [`Geometry`] — A water region or a fixed structure
//! - [`Shape`] — Cube, box, sphere, ellipsoid, cylinder, or plane
//! - [`GeometryOptions`] — Molecule count (`number` or `density`) and side
//! - [`PackSession`] — Ordered geometries plus solver settings
//! - [`PackConfig`] / [`ResourcePaths`] — Solver binary, file type, data files
//! - [`PackJob`] — A full run described in TOML

mod model;
mod pack;

pub mod io;

pub use model::atom::Atom;
pub use model::bounds::Bounds;
pub use model::types::{Element, ParseElementError, ParseSideError, Side};

pub use pack::{
    AVOGADRO, Cube, Cuboid, Cylinder, DEFAULT_NLOOP0, DEFAULT_TOLERANCE, Ellipsoid,
    FixedStructure, Geometry, GeometryEntry, GeometryOptions, PackConfig, PackJob, PackOptions,
    PackSession, PackSummary, Plane, Region, ResourcePaths, Shape, ShapeSpec, Sphere,
    WATER_MOLAR_MASS, Workspace, molecules_from_density, pack,
};

pub use io::Format;

pub use pack::Error as PackError;
