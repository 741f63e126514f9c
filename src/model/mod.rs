//! Plain data types shared by the packing pipeline and the file readers.
//!
//! - [`atom`] – Element plus Cartesian position, as read back from the solver.
//! - [`types`] – Supported elements and region placement sides.
//! - [`bounds`] – Axis-aligned boxes used for the simulation cell.

pub mod atom;
pub mod bounds;
pub mod types;
