//! Scratch directory handling and the external compiler invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{MatteError, Result};

/// File the synthesized program is written to inside the scratch directory.
pub const PROGRAM_FILE: &str = "app.go";

/// Remove a scratch directory left behind by a previous run.
pub fn clean_scratch_dir(scratch_dir: &Path) -> Result<()> {
    if scratch_dir.exists() {
        fs::remove_dir_all(scratch_dir)
            .map_err(|e| MatteError::io_at("remove scratch directory", scratch_dir, e))?;
        debug!(dir = %scratch_dir.display(), "stale scratch directory removed");
    }
    Ok(())
}

/// Recreate the scratch directory holding exactly the synthesized program.
pub fn write_program(scratch_dir: &Path, source: &str) -> Result<PathBuf> {
    clean_scratch_dir(scratch_dir)?;
    fs::create_dir_all(scratch_dir)
        .map_err(|e| MatteError::io_at("create scratch directory", scratch_dir, e))?;
    let path = scratch_dir.join(PROGRAM_FILE);
    fs::write(&path, source).map_err(|e| MatteError::io_at("write", &path, e))?;
    info!(path = %path.display(), "program written");
    Ok(path)
}

/// Run `<go_bin> build -o <output> .` inside `scratch_dir`.
///
/// The caller's working directory is left alone; the compiler gets its own.
/// A non-zero exit becomes [`MatteError::Build`] carrying stderr verbatim.
pub fn build_program(go_bin: &str, scratch_dir: &Path, output: &str) -> Result<PathBuf> {
    info!(compiler = go_bin, dir = %scratch_dir.display(), output, "compiling program");
    let result = Command::new(go_bin)
        .args(["build", "-o", output, "."])
        .current_dir(scratch_dir)
        .output()
        .map_err(|e| MatteError::io(format!("unable to run {go_bin}"), e))?;
    if !result.status.success() {
        let mut diagnostics = String::from_utf8_lossy(&result.stderr).into_owned();
        if diagnostics.trim().is_empty() {
            diagnostics = String::from_utf8_lossy(&result.stdout).into_owned();
        }
        return Err(MatteError::Build { diagnostics });
    }
    let stdout = String::from_utf8_lossy(&result.stdout);
    if !stdout.trim().is_empty() {
        debug!(output = %stdout.trim(), "compiler output");
    }
    Ok(scratch_dir.join(output))
}
