//! Declarative packing jobs loaded from TOML.
//!
//! ```toml
//! output = "water_10000mol_PBC.out"
//! periodic_margin = 2.0
//!
//! [config]
//! solver = "packmol"
//!
//! [[geometry]]
//! shape = "cube"
//! origin = [0, 0, 0]
//! length = 40
//! number = 10000
//! ```

use super::config::{DEFAULT_TOLERANCE, GeometryOptions, PackConfig, PackOptions};
use super::error::Error;
use super::geometry::Geometry;
use super::session::{PackSession, PackSummary};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Shape and placement of one `[[geometry]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ShapeSpec {
    Cube {
        origin: [f64; 3],
        length: f64,
    },
    Box {
        lo: [f64; 3],
        hi: [f64; 3],
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Ellipsoid {
        center: [f64; 3],
        semi_axes: [f64; 3],
        radius: f64,
    },
    Cylinder {
        base: [f64; 3],
        direction: [f64; 3],
        radius: f64,
        length: f64,
    },
    Plane {
        normal: [f64; 3],
        offset: f64,
    },
    Fixed {
        path: PathBuf,
        #[serde(default)]
        position: [f64; 3],
        #[serde(default)]
        rotation: [f64; 3],
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryEntry {
    #[serde(flatten)]
    pub shape: ShapeSpec,
    #[serde(flatten)]
    pub options: GeometryOptions,
}

impl GeometryEntry {
    /// Builds the geometry; relative fixed-structure paths are joined to
    /// `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Geometry, Error> {
        let opts = &self.options;
        match &self.shape {
            ShapeSpec::Cube { origin, length } => Geometry::cube(*origin, *length, opts),
            ShapeSpec::Box { lo, hi } => Geometry::cuboid(*lo, *hi, opts),
            ShapeSpec::Sphere { center, radius } => Geometry::sphere(*center, *radius, opts),
            ShapeSpec::Ellipsoid {
                center,
                semi_axes,
                radius,
            } => Geometry::ellipsoid(*center, *semi_axes, *radius, opts),
            ShapeSpec::Cylinder {
                base,
                direction,
                radius,
                length,
            } => Geometry::cylinder(*base, *direction, *radius, *length, opts),
            ShapeSpec::Plane { normal, offset } => Geometry::plane(*normal, *offset, opts),
            ShapeSpec::Fixed {
                path,
                position,
                rotation,
            } => {
                if opts.density.is_some()
                    || opts.side.is_some()
                    || opts.number.is_some_and(|n| n != 1)
                {
                    log::warn!(
                        "fixed structure {} is placed once and ignores number, density and side options",
                        path.display()
                    );
                }
                Geometry::fixed(base_dir.join(path), *position, *rotation)
            }
        }
    }
}

/// A complete packing run: session settings, geometries and output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PackJob {
    /// Data file to write.
    pub output: PathBuf,

    #[serde(default)]
    pub periodic_margin: Option<f64>,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default)]
    pub config: PackConfig,

    #[serde(default, rename = "geometry")]
    pub geometries: Vec<GeometryEntry>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl PackJob {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a job file, resolving relative paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut job = Self::from_toml_str(&text)?;
        job.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(job)
    }

    pub fn options(&self) -> PackOptions {
        PackOptions {
            tolerance: self.tolerance,
            periodic_margin: self.periodic_margin,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.base_dir.join(&self.output)
    }

    /// Builds a session holding every geometry in file order.
    pub fn session(&self) -> Result<PackSession, Error> {
        let mut session = PackSession::new(self.config.clone());
        for (i, entry) in self.geometries.iter().enumerate() {
            let geometry = entry.build(&self.base_dir).map_err(|e| match e {
                Error::InvalidArgument(msg) => {
                    Error::InvalidArgument(format!("geometry #{}: {}", i + 1, msg))
                }
                other => other,
            })?;
            session.append(geometry);
        }
        Ok(session)
    }

    pub fn run(&self) -> Result<PackSummary, Error> {
        self.session()?.pack(self.output_path(), &self.options())
    }
}
