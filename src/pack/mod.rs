mod config;
mod density;
mod error;
mod geometry;
mod job;
mod script;
mod session;
mod solver;

pub use config::{
    DEFAULT_NLOOP0, DEFAULT_TOLERANCE, GeometryOptions, PackConfig, PackOptions, ResourcePaths,
};
pub use density::{AVOGADRO, WATER_MOLAR_MASS, molecules_from_density};
pub use error::Error;
pub use geometry::{
    Cube, Cuboid, Cylinder, Ellipsoid, FixedStructure, Geometry, Plane, Region, Shape, Sphere,
};
pub use job::{GeometryEntry, PackJob, ShapeSpec};
pub use session::{PackSession, PackSummary};
pub use solver::Workspace;

use std::path::Path;

/// Packs `geometries` with default settings and writes a LAMMPS data file.
///
/// Shorthand for building a [`PackSession`] with [`PackConfig::default`]
/// and calling [`PackSession::pack`].
pub fn pack<I>(
    geometries: I,
    output: impl AsRef<Path>,
    options: &PackOptions,
) -> Result<PackSummary, Error>
where
    I: IntoIterator<Item = Geometry>,
{
    let mut session = PackSession::default();
    for geometry in geometries {
        session.append(geometry);
    }
    session.pack(output, options)
}
