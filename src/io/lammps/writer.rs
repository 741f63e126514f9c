use crate::io::error::Error;
use crate::model::{atom::Atom, bounds::Bounds, types::Element};
use std::io::Write;

/// Water elements keep fixed type codes so data files from different runs
/// share one force-field mapping.
const FIXED_TYPES: [(Element, usize); 2] = [(Element::H, 1), (Element::O, 2)];

/// Assignment of LAMMPS integer atom types to elements.
///
/// Hydrogen is always type 1 and oxygen type 2. Any further element (from a
/// fixed substrate) takes the next free code in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap {
    codes: Vec<(Element, usize)>,
}

impl TypeMap {
    pub fn from_atoms(atoms: &[Atom]) -> Self {
        let mut codes = FIXED_TYPES.to_vec();
        for atom in atoms {
            if !codes.iter().any(|(e, _)| *e == atom.element) {
                let next = codes.len() + 1;
                codes.push((atom.element, next));
            }
        }
        Self { codes }
    }

    pub fn code(&self, element: Element) -> Option<usize> {
        self.codes
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, code)| *code)
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.codes.len()
    }
}

pub fn write<W: Write>(
    mut writer: W,
    title: &str,
    atoms: &[Atom],
    bounds: &Bounds,
) -> Result<(), Error> {
    let types = TypeMap::from_atoms(atoms);

    writeln!(writer, "{}", title.trim())?;
    writeln!(writer)?;
    writeln!(writer, "{} atoms", atoms.len())?;
    writeln!(writer, "{} atom types", types.type_count())?;
    for (k, axis) in ["x", "y", "z"].iter().enumerate() {
        writeln!(
            writer,
            "{:?} {:?} {axis}lo {axis}hi",
            bounds.lo[k],
            bounds.hi[k],
            axis = axis
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Atoms")?;
    writeln!(writer)?;

    for (i, atom) in atoms.iter().enumerate() {
        let code = types.code(atom.element).ok_or_else(|| {
            Error::Conversion(format!("no atom type assigned to element {}", atom.element))
        })?;
        writeln!(
            writer,
            "{} {} {:.6} {:.6} {:.6}",
            i + 1,
            code,
            atom.position[0],
            atom.position[1],
            atom.position[2]
        )?;
    }

    Ok(())
}
