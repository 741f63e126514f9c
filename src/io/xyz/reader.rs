use crate::io::{Format, error::Error};
use crate::model::{atom::Atom, types::Element};
use std::io::BufRead;

pub fn read<R: BufRead>(reader: R) -> Result<Vec<Atom>, Error> {
    let lines = collect_lines(reader)?;

    let (count_line_no, count_line) = lines
        .first()
        .ok_or_else(|| Error::parse(Format::Xyz, 1, "file is empty"))?;
    let atom_count = count_line
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Xyz, *count_line_no, "invalid atom count line"))?;

    let records: Vec<&(usize, String)> = lines
        .iter()
        .skip(2)
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if records.len() < atom_count {
        return Err(Error::parse(
            Format::Xyz,
            lines.last().map(|(ln, _)| *ln).unwrap_or(1),
            format!(
                "expected {} atom records, found {}",
                atom_count,
                records.len()
            ),
        ));
    }
    if let Some((ln, _)) = records.get(atom_count) {
        return Err(Error::parse(
            Format::Xyz,
            *ln,
            format!("more atom records than the declared {}", atom_count),
        ));
    }

    records
        .into_iter()
        .map(|(ln, line)| parse_atom(line, *ln))
        .collect()
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|v| (i + 1, v))
                .map_err(|e| Error::Io { source: e })
        })
        .collect()
}

fn parse_atom(line: &str, line_no: usize) -> Result<Atom, Error> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            "atom record must contain an element and three coordinates",
        ));
    }

    let element = tokens[0]
        .parse::<Element>()
        .map_err(|e| Error::parse(Format::Xyz, line_no, e.to_string()))?;

    let mut position = [0.0; 3];
    for (k, token) in tokens[1..4].iter().enumerate() {
        position[k] = token
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::Xyz, line_no, format!("invalid coordinate '{}'", token)))?;
    }

    Ok(Atom::new(element, position))
}
