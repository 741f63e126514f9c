//! Scoped intermediate files and the blocking call to the packing solver.

use super::config::PackConfig;
use super::error::Error;
use crate::io::Format;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const SCRIPT_NAME: &str = "input.inp";
const RAW_OUTPUT_STEM: &str = "water_packmol";
const STDERR_TAIL_LINES: usize = 10;

/// Private directory holding one run's script and raw solver output.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, on success and failure alike.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    script: PathBuf,
    raw_output: PathBuf,
}

impl Workspace {
    pub fn new(filetype: Format) -> Result<Self, Error> {
        let dir = tempfile::Builder::new().prefix("pack-water-").tempdir()?;
        let script = dir.path().join(SCRIPT_NAME);
        let raw_output = dir
            .path()
            .join(format!("{}.{}", RAW_OUTPUT_STEM, filetype.keyword()));
        log::debug!("created packing workspace at {}", dir.path().display());
        Ok(Self {
            dir,
            script,
            raw_output,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[inline]
    pub fn script_path(&self) -> &Path {
        &self.script
    }

    #[inline]
    pub fn raw_output_path(&self) -> &Path {
        &self.raw_output
    }
}

/// Runs the solver on `script` and waits for it to exit.
///
/// There is no timeout: a solver that never converges blocks the caller.
pub fn run(
    config: &PackConfig,
    script: &Path,
    workdir: &Path,
    expected_output: &Path,
) -> Result<(), Error> {
    let stdin = File::open(script).map_err(|e| {
        Error::solver_failed(format!("cannot open script '{}': {}", script.display(), e))
    })?;

    log::info!(
        "running {} on {}",
        config.solver.display(),
        script.display()
    );

    let output = Command::new(&config.solver)
        .args(&config.solver_args)
        .current_dir(workdir)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            Error::solver_failed(format!(
                "cannot launch '{}': {}",
                config.solver.display(),
                e
            ))
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        log::warn!("solver wrote to stderr:\n{}", stderr.trim_end());
    }

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(Error::solver_failed(format!(
            "'{}' exited with status {}{}",
            config.solver.display(),
            code,
            tail(&stderr, &String::from_utf8_lossy(&output.stdout))
        )));
    }

    if !expected_output.is_file() {
        return Err(Error::solver_failed(format!(
            "'{}' finished but wrote no output to {}",
            config.solver.display(),
            expected_output.display()
        )));
    }

    log::info!("solver finished, output at {}", expected_output.display());
    Ok(())
}

/// Last lines of the solver's diagnostics, preferring stderr.
fn tail(stderr: &str, stdout: &str) -> String {
    let source = if stderr.trim().is_empty() { stdout } else { stderr };
    let lines: Vec<&str> = source.trim_end().lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    format!(": {}", lines[start..].join(" | "))
}
