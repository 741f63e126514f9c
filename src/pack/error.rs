//! Error types for building and running a packing session.
//!
//! Errors are grouped by the stage that raised them: geometry construction
//! (invalid arguments, ambiguous molecule counts), the external solver, and
//! the conversion of its output into a simulation data file.

use thiserror::Error;

/// Errors that can occur while compiling, solving, or converting a packing.
#[derive(Debug, Error)]
pub enum Error {
    /// A geometry or session argument is out of range or malformed.
    ///
    /// Raised for unknown `side` tokens, negative lengths, inverted boxes,
    /// non-positive densities, and shapes whose count cannot be resolved
    /// from a density.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Exactly one of `number` or `density` must determine the count.
    #[error(
        "ambiguous molecule count: exactly one of `number` or `density` must be given (number: {number:?}, density: {density:?})"
    )]
    DensityAmbiguity {
        /// Explicit molecule count, if any.
        number: Option<u64>,
        /// Target mass density in g/cm³, if any.
        density: Option<f64>,
    },

    /// The packing solver could not be launched, exited unsuccessfully, or
    /// produced no output file.
    #[error("packing solver failed: {0}")]
    SolverFailed(String),

    /// The solver output could not be read or rewritten as a data file.
    #[error("conversion of solver output failed: {0}")]
    ConversionFailed(String),

    /// Failed to write the solver script or workspace files.
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse a TOML packing job.
    #[error("failed to parse packing job: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<crate::io::Error> for Error {
    fn from(e: crate::io::Error) -> Self {
        Error::ConversionFailed(e.to_string())
    }
}

impl Error {
    /// Creates an [`InvalidArgument`](Error::InvalidArgument) error.
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument(details.into())
    }

    /// Creates a [`SolverFailed`](Error::SolverFailed) error.
    pub fn solver_failed(details: impl Into<String>) -> Self {
        Self::SolverFailed(details.into())
    }

    /// Creates a [`ConversionFailed`](Error::ConversionFailed) error.
    pub fn conversion_failed(details: impl Into<String>) -> Self {
        Self::ConversionFailed(details.into())
    }
}
