use crate::io::{Format, error::Error};
use crate::model::{atom::Atom, types::Element};
use std::io::BufRead;

/// Reads coordinates from `ATOM`/`HETATM` records of the first model.
pub fn read<R: BufRead>(reader: R) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io { source: e })?;
        let line_no = i + 1;

        if line.starts_with("ENDMDL") || line.trim_end() == "END" {
            break;
        }
        if !(line.starts_with("ATOM  ") || line.starts_with("HETATM")) {
            continue;
        }

        atoms.push(parse_atom(&line, line_no)?);
    }

    Ok(atoms)
}

fn parse_atom(line: &str, line_no: usize) -> Result<Atom, Error> {
    let mut position = [0.0; 3];
    for (k, (start, end)) in [(30, 38), (38, 46), (46, 54)].into_iter().enumerate() {
        let field = column(line, start, end).ok_or_else(|| {
            Error::parse(Format::Pdb, line_no, "record too short for coordinates")
        })?;
        position[k] = field.parse::<f64>().map_err(|_| {
            Error::parse(Format::Pdb, line_no, format!("invalid coordinate '{}'", field))
        })?;
    }

    let element = parse_element(line)
        .ok_or_else(|| Error::parse(Format::Pdb, line_no, "cannot determine element"))?;

    Ok(Atom::new(element, position))
}

fn parse_element(line: &str) -> Option<Element> {
    if let Some(symbol) = column(line, 76, 78).filter(|s| !s.is_empty()) {
        return symbol.parse().ok();
    }

    // No element column: fall back to the leading letters of the atom name.
    let name: String = column(line, 12, 16)?
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    name.parse()
        .ok()
        .or_else(|| name.get(..1).and_then(|s| s.parse().ok()))
}

fn column(line: &str, start: usize, end: usize) -> Option<&str> {
    if line.len() <= start {
        return None;
    }
    line.get(start..end.min(line.len())).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const WATER: &str = "\
REMARK   Built with Packmol
HETATM    1  O   HOH A   1      10.000  11.000  12.000  1.00  0.00           O
HETATM    2  H1  HOH A   1      10.500  11.000  12.000  1.00  0.00           H
HETATM    3  H2  HOH A   1       9.500  11.000  12.000  1.00  0.00           H
END
HETATM    4  O   HOH A   2       0.000   0.000   0.000  1.00  0.00           O
";

    #[test]
    fn reads_hetatm_records_until_end() {
        let atoms = read(Cursor::new(WATER)).expect("read pdb");
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0], Atom::new(Element::O, [10.0, 11.0, 12.0]));
        assert_eq!(atoms[1].element, Element::H);
        assert_eq!(atoms[2].position, [9.5, 11.0, 12.0]);
    }

    #[test]
    fn falls_back_to_atom_name_without_element_column() {
        let data = "ATOM      1 SI   SIO X   1       1.000   2.000   3.000\n\
                    ATOM      2  O1  SIO X   1       1.500   2.000   3.000\n";
        let atoms = read(Cursor::new(data)).expect("read pdb");
        assert_eq!(atoms[0].element, Element::Si);
        assert_eq!(atoms[1].element, Element::O);
    }

    #[test]
    fn reads_substrate_elements_outside_water() {
        let data = "\
HETATM    1 ZR   ZRO X   1       0.000   0.000   0.000  1.00  0.00          ZR
HETATM    2 GE   GEO X   1       1.000   0.000   0.000  1.00  0.00          Ge
";
        let atoms = read(Cursor::new(data)).expect("read pdb");
        assert_eq!(atoms[0].element, Element::Zr);
        assert_eq!(atoms[1].element, Element::Ge);
    }

    #[test]
    fn reads_shipped_reference_structure() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/water.pdb");
        let file = std::fs::File::open(path).expect("open water.pdb");
        let atoms = read(std::io::BufReader::new(file)).expect("read pdb");
        let elements: Vec<_> = atoms.iter().map(|a| a.element).collect();
        assert_eq!(elements, vec![Element::O, Element::H, Element::H]);
    }

    #[test]
    fn rejects_short_or_garbled_records() {
        let short = "HETATM    1  O   HOH A   1      10.000\n";
        assert!(read(Cursor::new(short)).is_err());

        let garbled = "HETATM    1  O   HOH A   1      10.000  xx.000  12.000  1.00  0.00           O\n";
        match read(Cursor::new(garbled)).unwrap_err() {
            Error::Parse { format, line, .. } => {
                assert_eq!(format, Format::Pdb);
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
