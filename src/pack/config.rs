//! Configuration types for packing sessions.
//!
//! - [`PackConfig`] — solver binary, output file type, iteration limit and
//!   resource locations shared by every run of a session
//! - [`ResourcePaths`] — where the reference water structures live
//! - [`PackOptions`] — per-run tolerance and periodic margin
//! - [`GeometryOptions`] — molecule count and side options of one region

use crate::io::Format;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default minimum distance between packed molecules, in Å.
pub const DEFAULT_TOLERANCE: f64 = 2.0;

/// Default `nloop0` iteration limit passed to the solver.
pub const DEFAULT_NLOOP0: u32 = 1000;

/// Locations of read-only files the instruction blocks refer to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    /// Directory holding `water.xyz` and `water.pdb`.
    pub structure_dir: PathBuf,
}

impl ResourcePaths {
    pub fn new(structure_dir: impl Into<PathBuf>) -> Self {
        Self {
            structure_dir: structure_dir.into(),
        }
    }

    /// Path of the single-molecule reference structure for `format`.
    pub fn water_structure(&self, format: Format) -> PathBuf {
        self.structure_dir
            .join(format!("water.{}", format.keyword()))
    }
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }
}

/// Session-wide settings for the external packing solver.
///
/// # Examples
///
/// ```
/// use pack_water::{Format, PackConfig};
///
/// let config = PackConfig {
///     filetype: Format::Pdb,
///     ..Default::default()
/// };
/// assert_eq!(config.solver.to_str(), Some("packmol"));
/// assert_eq!(config.nloop0, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Solver executable, resolved through `PATH` when relative.
    pub solver: PathBuf,

    /// Extra arguments placed before the script is piped to stdin.
    pub solver_args: Vec<String>,

    /// File type of reference structures and of the raw solver output.
    pub filetype: Format,

    /// Value of the `nloop0` directive.
    pub nloop0: u32,

    pub resources: ResourcePaths,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::from("packmol"),
            solver_args: Vec::new(),
            filetype: Format::default(),
            nloop0: DEFAULT_NLOOP0,
            resources: ResourcePaths::default(),
        }
    }
}

/// Settings of a single [`pack`](super::PackSession::pack) call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackOptions {
    /// Minimum distance between molecules of different copies, in Å.
    pub tolerance: f64,

    /// Padding added to the upper corner of the box on every axis so that
    /// molecules do not overlap across periodic images.
    pub periodic_margin: Option<f64>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            periodic_margin: None,
        }
    }
}

impl PackOptions {
    pub fn periodic(margin: f64) -> Self {
        Self {
            periodic_margin: Some(margin),
            ..Self::default()
        }
    }
}

/// Recognized construction options of a water region.
///
/// Exactly one of `number` and `density` must be set. `side` takes the
/// short tokens `in`/`out` (and `over`/`below` for planes).
///
/// # Examples
///
/// ```
/// use pack_water::GeometryOptions;
///
/// let opts = GeometryOptions::density(0.998).with_side("out");
/// assert_eq!(opts.number, None);
/// assert_eq!(opts.side.as_deref(), Some("out"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryOptions {
    /// Explicit molecule count.
    pub number: Option<u64>,

    /// Target mass density in g/cm³.
    pub density: Option<f64>,

    pub side: Option<String>,
}

impl GeometryOptions {
    pub fn number(number: u64) -> Self {
        Self {
            number: Some(number),
            ..Self::default()
        }
    }

    pub fn density(density: f64) -> Self {
        Self {
            density: Some(density),
            ..Self::default()
        }
    }

    pub fn with_side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }
}
