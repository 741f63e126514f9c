use super::config::{PackConfig, PackOptions};
use super::error::Error;
use super::geometry::Geometry;
use super::script::{self, ScriptHeader};
use super::solver::{self, Workspace};
use crate::io;
use crate::model::bounds::Bounds;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Atoms per water molecule: one oxygen and two hydrogens.
const ATOMS_PER_WATER: u64 = 3;

/// Outcome of converting a packing into a data file.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSummary {
    /// Path of the written data file.
    pub output: PathBuf,
    /// Molecule copies requested across all geometries.
    pub molecules: u64,
    /// Atom records written.
    pub atoms: usize,
    /// Simulation box, including any periodic margin.
    pub bounds: Bounds,
}

/// An ordered collection of geometries packed together in one solver run.
///
/// Order is preserved in the solver script; later entries are usually
/// nested in earlier ones to carve out excluded volumes.
///
/// # Examples
///
/// ```
/// use pack_water::{Geometry, GeometryOptions, PackSession};
///
/// let mut session = PackSession::default();
/// session
///     .append(Geometry::cuboid([0.0; 3], [10.0; 3], &GeometryOptions::number(30))?)
///     .append(Geometry::sphere([20.0; 3], 5.0, &GeometryOptions::number(10))?);
///
/// let bounds = session.bounding_box().unwrap();
/// assert_eq!(bounds.lo, [0.0; 3]);
/// assert_eq!(bounds.hi, [25.0; 3]);
/// assert_eq!(session.molecule_count(), 40);
/// # Ok::<(), pack_water::PackError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackSession {
    geometries: Vec<Geometry>,
    config: PackConfig,
}

impl PackSession {
    pub fn new(config: PackConfig) -> Self {
        Self {
            geometries: Vec::new(),
            config,
        }
    }

    /// Appends a geometry. Overlaps and nesting order are not checked.
    pub fn append(&mut self, geometry: Geometry) -> &mut Self {
        log::debug!(
            "appending {} with {} molecule(s)",
            geometry.label(),
            geometry.number()
        );
        self.geometries.push(geometry);
        self
    }

    #[inline]
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    #[inline]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Total copies across all geometries; fixed structures count once.
    pub fn molecule_count(&self) -> u64 {
        self.geometries.iter().map(Geometry::number).sum()
    }

    /// Union of the bounds of every geometry that exposes them.
    ///
    /// Cylinders, planes and fixed structures are skipped.
    pub fn bounding_box(&self) -> Option<Bounds> {
        self.geometries
            .iter()
            .filter_map(|g| {
                let bounds = g.bounds();
                if bounds.is_none() {
                    log::debug!("{} exposes no bounds, skipped in box", g.label());
                }
                bounds
            })
            .reduce(|acc, b| acc.union(&b))
    }

    /// Acquires a fresh workspace for the step-wise API.
    pub fn workspace(&self) -> Result<Workspace, Error> {
        Workspace::new(self.config.filetype)
    }

    /// Writes the solver script directing output to `raw_output`.
    pub fn write_script<W: Write>(
        &self,
        writer: W,
        raw_output: &Path,
        tolerance: f64,
    ) -> Result<(), Error> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(Error::invalid_argument(format!(
                "tolerance must be positive, got {}",
                tolerance
            )));
        }
        if self.geometries.is_empty() {
            return Err(Error::invalid_argument("session contains no geometries"));
        }

        let header = ScriptHeader {
            tolerance,
            filetype: self.config.filetype,
            output: raw_output,
            nloop0: self.config.nloop0,
        };
        let water = self
            .config
            .resources
            .water_structure(self.config.filetype);
        script::write_script(writer, &header, &self.geometries, &water)?;
        Ok(())
    }

    /// Writes the solver script into the workspace.
    pub fn generate_script(&self, workspace: &Workspace, tolerance: f64) -> Result<(), Error> {
        let file = File::create(workspace.script_path())?;
        self.write_script(
            BufWriter::new(file),
            workspace.raw_output_path(),
            tolerance,
        )?;
        log::info!(
            "wrote solver script for {} geometries to {}",
            self.geometries.len(),
            workspace.script_path().display()
        );
        Ok(())
    }

    /// Runs the solver on the workspace script and blocks until it exits.
    pub fn invoke_solver(&self, workspace: &Workspace) -> Result<(), Error> {
        solver::run(
            &self.config,
            workspace.script_path(),
            workspace.path(),
            workspace.raw_output_path(),
        )
    }

    /// Converts the raw solver output into a LAMMPS data file at `output`.
    ///
    /// The box is the session's [`bounding_box`](Self::bounding_box), or the
    /// extent of the atoms when no geometry has bounds, with the upper
    /// corner padded by `periodic_margin` when given.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `periodic_margin` is negative or not
    /// finite. [`Error::ConversionFailed`] when the raw output cannot be read or
    /// parsed, when its atom count disagrees with the requested water
    /// molecules, or when the data file cannot be written. No partial data
    /// file is left behind.
    pub fn finalize(
        &self,
        raw_output: &Path,
        output: &Path,
        periodic_margin: Option<f64>,
    ) -> Result<PackSummary, Error> {
        if let Some(margin) = periodic_margin.filter(|m| !m.is_finite() || *m < 0.0) {
            return Err(Error::invalid_argument(format!(
                "periodic margin must be finite and non-negative, got {}",
                margin
            )));
        }

        let file = File::open(raw_output).map_err(|e| {
            Error::conversion_failed(format!(
                "cannot open solver output '{}': {}",
                raw_output.display(),
                e
            ))
        })?;
        let atoms = io::read_atoms(BufReader::new(file), self.config.filetype)?;
        self.check_atom_count(atoms.len())?;

        let mut bounds = self
            .bounding_box()
            .or_else(|| Bounds::enclosing(atoms.iter().map(|a| a.position)))
            .ok_or_else(|| Error::conversion_failed("no bounded geometry and no atoms"))?;
        if let Some(margin) = periodic_margin {
            bounds = bounds.expand_upper(margin);
        }

        let title = format!("{} (built with packmol)", output.display());
        let mut buf = Vec::new();
        io::write_lammps_data(&mut buf, &title, &atoms, &bounds)?;
        fs::write(output, buf).map_err(|e| {
            Error::conversion_failed(format!("cannot write '{}': {}", output.display(), e))
        })?;

        log::info!(
            "wrote {} atoms to {}",
            atoms.len(),
            output.display()
        );
        Ok(PackSummary {
            output: output.to_path_buf(),
            molecules: self.molecule_count(),
            atoms: atoms.len(),
            bounds,
        })
    }

    /// Generates the script, runs the solver and writes the data file.
    ///
    /// Intermediate files live in a private workspace that is removed
    /// before returning, whichever stage fails.
    pub fn pack(
        &self,
        output: impl AsRef<Path>,
        options: &PackOptions,
    ) -> Result<PackSummary, Error> {
        let workspace = self.workspace()?;
        self.generate_script(&workspace, options.tolerance)?;
        self.invoke_solver(&workspace)?;
        self.finalize(
            workspace.raw_output_path(),
            output.as_ref(),
            options.periodic_margin,
        )
    }

    /// Without fixed structures every record must belong to a water copy.
    fn check_atom_count(&self, atoms: usize) -> Result<(), Error> {
        if self.geometries.iter().any(Geometry::is_fixed) {
            return Ok(());
        }
        let expected = ATOMS_PER_WATER * self.molecule_count();
        if atoms as u64 != expected {
            return Err(Error::conversion_failed(format!(
                "solver output holds {} atoms, expected {} for {} water molecules",
                atoms,
                expected,
                self.molecule_count()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Format;
    use crate::pack::config::GeometryOptions;
    use std::fmt::Write as _;

    fn raw_water_xyz(molecules: usize, side: f64) -> String {
        let mut text = format!("{}\n Built with Packmol\n", molecules * 3);
        let per_axis = (molecules as f64).cbrt().ceil() as usize;
        let step = side / per_axis as f64;
        for m in 0..molecules {
            let x = (m % per_axis) as f64 * step + 1.0;
            let y = ((m / per_axis) % per_axis) as f64 * step + 1.0;
            let z = (m / (per_axis * per_axis)) as f64 * step + 1.0;
            let _ = writeln!(text, " O {:.5} {:.5} {:.5}", x, y, z);
            let _ = writeln!(text, " H {:.5} {:.5} {:.5}", x + 0.757, y + 0.586, z);
            let _ = writeln!(text, " H {:.5} {:.5} {:.5}", x - 0.757, y + 0.586, z);
        }
        text
    }

    #[test]
    fn bounding_box_spans_box_and_sphere() {
        let mut session = PackSession::default();
        session
            .append(Geometry::cuboid([0.0; 3], [10.0; 3], &GeometryOptions::number(1)).unwrap())
            .append(
                Geometry::sphere([20.0, 20.0, 20.0], 5.0, &GeometryOptions::number(1)).unwrap(),
            );
        let b = session.bounding_box().unwrap();
        assert_eq!(b.lo, [0.0, 0.0, 0.0]);
        assert_eq!(b.hi, [25.0, 25.0, 25.0]);
    }

    #[test]
    fn unbounded_geometries_are_skipped() {
        let mut session = PackSession::default();
        session
            .append(
                Geometry::cylinder([0.0; 3], [0.0, 0.0, 1.0], 100.0, 100.0, &GeometryOptions::number(1))
                    .unwrap(),
            )
            .append(
                Geometry::plane([0.0, 0.0, 1.0], 0.0, &GeometryOptions::number(1).with_side("over"))
                    .unwrap(),
            );
        assert!(session.bounding_box().is_none());

        session.append(Geometry::cube([1.0; 3], 2.0, &GeometryOptions::number(1)).unwrap());
        let b = session.bounding_box().unwrap();
        assert_eq!(b.lo, [1.0; 3]);
        assert_eq!(b.hi, [3.0; 3]);
    }

    #[test]
    fn fixed_contributes_one_molecule() {
        let mut session = PackSession::default();
        session
            .append(Geometry::fixed("substrate.pdb", [0.0; 3], [0.0; 3]).unwrap())
            .append(Geometry::cube([0.0; 3], 10.0, &GeometryOptions::number(25)).unwrap());
        assert_eq!(session.molecule_count(), 26);
    }

    #[test]
    fn script_refuses_empty_session_and_bad_tolerance() {
        let empty = PackSession::default();
        assert!(matches!(
            empty.write_script(Vec::new(), Path::new("raw.xyz"), 2.0),
            Err(Error::InvalidArgument(_))
        ));

        let mut session = PackSession::default();
        session.append(Geometry::cube([0.0; 3], 10.0, &GeometryOptions::number(1)).unwrap());
        assert!(matches!(
            session.write_script(Vec::new(), Path::new("raw.xyz"), 0.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn generated_script_points_at_workspace_and_reference_structure() {
        let config = PackConfig {
            filetype: Format::Pdb,
            nloop0: 50,
            ..PackConfig::default()
        };
        let mut session = PackSession::new(config);
        session.append(Geometry::cube([0.0; 3], 40.0, &GeometryOptions::number(10_000)).unwrap());

        let ws = session.workspace().unwrap();
        session.generate_script(&ws, 2.5).unwrap();
        let text = fs::read_to_string(ws.script_path()).unwrap();

        assert!(text.starts_with("tolerance 2.5\nfiletype pdb\n"));
        assert!(text.contains(&format!("output {}\n", ws.raw_output_path().display())));
        assert!(text.contains("nloop0 50\n"));
        assert!(text.contains("water.pdb\n  number 10000\n  inside cube 0 0 0 40\n"));
    }

    #[test]
    fn finalize_periodic_cube_of_ten_thousand() {
        let mut session = PackSession::default();
        session.append(Geometry::cube([0.0; 3], 40.0, &GeometryOptions::number(10_000)).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xyz");
        fs::write(&raw, raw_water_xyz(10_000, 38.0)).unwrap();
        let out = dir.path().join("water_10000mol_PBC.out");

        let summary = session.finalize(&raw, &out, Some(2.0)).unwrap();
        assert_eq!(summary.atoms, 30_000);
        assert_eq!(summary.molecules, 10_000);
        assert_eq!(summary.bounds.hi, [42.0; 3]);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("(built with packmol)"));
        assert_eq!(lines[2], "30000 atoms");
        assert_eq!(lines[3], "2 atom types");
        assert_eq!(lines[4], "0.0 42.0 xlo xhi");
        assert_eq!(lines[6], "0.0 42.0 zlo zhi");
        assert_eq!(lines[8], "Atoms");
        assert!(lines[10].starts_with("1 2 "));
        assert!(lines[11].starts_with("2 1 "));
        assert!(lines[lines.len() - 1].starts_with("30000 1 "));
    }

    #[test]
    fn finalize_without_margin_keeps_geometry_box() {
        let mut session = PackSession::default();
        session.append(Geometry::cube([0.0; 3], 10.0, &GeometryOptions::number(2)).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xyz");
        fs::write(&raw, raw_water_xyz(2, 8.0)).unwrap();
        let out = dir.path().join("water.data");

        let summary = session.finalize(&raw, &out, None).unwrap();
        assert_eq!(summary.bounds, Bounds::new([0.0; 3], [10.0; 3]));
    }

    #[test]
    fn finalize_falls_back_to_atom_extent() {
        let mut session = PackSession::default();
        session.append(
            Geometry::cylinder([0.0; 3], [1.0, 0.0, 0.0], 5.0, 20.0, &GeometryOptions::number(1))
                .unwrap(),
        );

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xyz");
        fs::write(&raw, "3\n\nO 1.0 1.0 1.0\nH 2.0 1.5 1.0\nH 0.0 1.5 1.0\n").unwrap();
        let out = dir.path().join("water.data");

        let summary = session.finalize(&raw, &out, Some(1.0)).unwrap();
        assert_eq!(summary.bounds.lo, [0.0, 1.0, 1.0]);
        assert_eq!(summary.bounds.hi, [3.0, 2.5, 2.0]);
    }

    #[test]
    fn finalize_rejects_atom_count_mismatch() {
        let mut session = PackSession::default();
        session.append(Geometry::cube([0.0; 3], 10.0, &GeometryOptions::number(5)).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xyz");
        fs::write(&raw, raw_water_xyz(4, 8.0)).unwrap();
        let out = dir.path().join("water.data");

        match session.finalize(&raw, &out, None).unwrap_err() {
            Error::ConversionFailed(msg) => assert!(msg.contains("expected 15")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!out.exists());
    }

    #[test]
    fn finalize_reports_missing_and_malformed_output() {
        let mut session = PackSession::default();
        session.append(Geometry::cube([0.0; 3], 10.0, &GeometryOptions::number(1)).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("water.data");

        let missing = session.finalize(&dir.path().join("absent.xyz"), &out, None);
        assert!(matches!(missing, Err(Error::ConversionFailed(_))));

        let raw = dir.path().join("raw.xyz");
        fs::write(&raw, "3\n\nO 0 0 0\n").unwrap();
        let malformed = session.finalize(&raw, &out, None);
        assert!(matches!(malformed, Err(Error::ConversionFailed(_))));
        assert!(!out.exists());
    }

    #[test]
    fn finalize_with_fixed_substrate_accepts_extra_atoms() {
        let config = PackConfig {
            filetype: Format::Pdb,
            ..PackConfig::default()
        };
        let mut session = PackSession::new(config);
        session
            .append(Geometry::fixed("slab.pdb", [0.0; 3], [0.0; 3]).unwrap())
            .append(Geometry::cuboid([0.0; 3], [20.0; 3], &GeometryOptions::number(1)).unwrap());

        let raw_pdb = "\
HETATM    1 SI   SIO X   1       1.000   1.000   1.000  1.00  0.00          SI
HETATM    2  O   SIO X   1       2.000   1.000   1.000  1.00  0.00           O
HETATM    3  O   HOH A   1      10.000  10.000  10.000  1.00  0.00           O
HETATM    4  H1  HOH A   1      10.757  10.586  10.000  1.00  0.00           H
HETATM    5  H2  HOH A   1       9.243  10.586  10.000  1.00  0.00           H
END
";
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.pdb");
        fs::write(&raw, raw_pdb).unwrap();
        let out = dir.path().join("water.data");

        let summary = session.finalize(&raw, &out, None).unwrap();
        assert_eq!(summary.atoms, 5);
        assert_eq!(summary.molecules, 2);
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("\n5 atoms\n3 atom types\n"));
        assert!(text.contains("\n1 3 1.000000 1.000000 1.000000\n"));
    }

    #[test]
    fn finalize_rejects_non_finite_margin() {
        let session = PackSession::default();
        let err = session
            .finalize(Path::new("raw.xyz"), Path::new("out.data"), Some(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn finalize_rejects_negative_margin() {
        let session = PackSession::default();
        let err = session
            .finalize(Path::new("raw.xyz"), Path::new("out.data"), Some(-2.0))
            .unwrap_err();
        match err {
            Error::InvalidArgument(msg) => assert!(msg.contains("non-negative"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn finalize_types_zirconia_substrate_after_water() {
        let config = PackConfig {
            filetype: Format::Pdb,
            ..PackConfig::default()
        };
        let mut session = PackSession::new(config);
        session
            .append(Geometry::fixed("zro2.pdb", [0.0; 3], [0.0; 3]).unwrap())
            .append(Geometry::cuboid([0.0; 3], [20.0; 3], &GeometryOptions::number(1)).unwrap());

        let raw_pdb = "\
HETATM    1 ZR   ZRO X   1       1.000   1.000   1.000  1.00  0.00          ZR
HETATM    2  O   ZRO X   1       2.000   1.000   1.000  1.00  0.00           O
HETATM    3  O   HOH A   1      10.000  10.000  10.000  1.00  0.00           O
HETATM    4  H1  HOH A   1      10.757  10.586  10.000  1.00  0.00           H
HETATM    5  H2  HOH A   1       9.243  10.586  10.000  1.00  0.00           H
END
";
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.pdb");
        fs::write(&raw, raw_pdb).unwrap();
        let out = dir.path().join("water.data");

        let summary = session.finalize(&raw, &out, Some(1.0)).unwrap();
        assert_eq!(summary.atoms, 5);
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("\n3 atom types\n"));
        assert!(text.contains("\n1 3 1.000000 1.000000 1.000000\n"));
        assert!(text.contains("\n2 2 2.000000 1.000000 1.000000\n"));
    }
}
