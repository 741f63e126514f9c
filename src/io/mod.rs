//! Readers for the solver's raw coordinate output and the LAMMPS data writer.
//!
//! The solver writes its result in the same file type it reads the
//! reference structures in, so the readers here mirror the formats the
//! packing script can request: [`Format::Xyz`] and [`Format::Pdb`].

use crate::model::{atom::Atom, bounds::Bounds};
use serde::Deserialize;
use std::fmt;
use std::io::{BufRead, Write};

pub mod error;

mod lammps;
mod pdb;
mod xyz;

pub use error::Error;
pub use lammps::writer::TypeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Xyz,
    Pdb,
}

impl Format {
    /// Keyword used both for the `filetype` directive and as file extension.
    pub fn keyword(&self) -> &'static str {
        match self {
            Format::Xyz => "xyz",
            Format::Pdb => "pdb",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
            Format::Pdb => write!(f, "PDB"),
        }
    }
}

pub fn read_atoms<R: BufRead>(reader: R, format: Format) -> Result<Vec<Atom>, Error> {
    match format {
        Format::Xyz => xyz::reader::read(reader),
        Format::Pdb => pdb::reader::read(reader),
    }
}

/// Writes atoms as a LAMMPS data file (`atomic` style) inside `bounds`.
pub fn write_lammps_data<W: Write>(
    writer: W,
    title: &str,
    atoms: &[Atom],
    bounds: &Bounds,
) -> Result<(), Error> {
    lammps::writer::write(writer, title, atoms, bounds)
}
