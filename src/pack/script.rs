//! Rendering of geometries and session headers in the solver's input grammar.

use super::geometry::Geometry;
use crate::io::Format;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

/// Global directives preceding the structure blocks.
#[derive(Debug, Clone, Copy)]
pub struct ScriptHeader<'a> {
    pub tolerance: f64,
    pub filetype: Format,
    pub output: &'a Path,
    pub nloop0: u32,
}

/// Renders one `structure ... end structure` block.
///
/// Regions replicate the `water` reference structure; fixed structures
/// name their own file.
pub fn instruction(geometry: &Geometry, water: &Path) -> String {
    let mut block = String::new();
    match geometry {
        Geometry::Region(region) => {
            let _ = writeln!(block, "structure {}", water.display());
            let _ = writeln!(block, "  number {}", region.number());
            let _ = write!(block, "  {} {}", region.side(), region.shape().label());
            for param in region.shape().params() {
                let _ = write!(block, " {}", param);
            }
            block.push('\n');
        }
        Geometry::Fixed(fixed) => {
            let _ = writeln!(block, "structure {}", fixed.path.display());
            block.push_str("  number 1\n");
            block.push_str("  center\n");
            block.push_str("  fixed");
            for param in geometry.params() {
                let _ = write!(block, " {}", param);
            }
            block.push('\n');
        }
    }
    block.push_str("end structure\n");
    block
}

/// Writes the complete solver input: header directives, then every block in
/// order, each preceded by a blank line.
pub fn write_script<W: Write>(
    mut writer: W,
    header: &ScriptHeader<'_>,
    geometries: &[Geometry],
    water: &Path,
) -> io::Result<()> {
    writeln!(writer, "tolerance {:?}", header.tolerance)?;
    writeln!(writer, "filetype {}", header.filetype.keyword())?;
    writeln!(writer, "output {}", header.output.display())?;
    writeln!(writer, "nloop0 {}", header.nloop0)?;
    for geometry in geometries {
        writeln!(writer)?;
        writer.write_all(instruction(geometry, water).as_bytes())?;
    }
    writer.flush()
}
