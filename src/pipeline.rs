//! # Build Pipeline
//!
//! The `build` and `configure` operations behind the CLI.
//!
//! `build` runs, in order:
//!
//! 1. resolve the module path from `go.mod` and check its `go` directive
//! 2. remove any stale scratch directory
//! 3. read `matte.toml` and instantiate the enabled frameworks
//! 4. load every package breadth-first
//! 5. configure the frameworks from `GeneralAPIInfo`
//! 6. register every annotated handler
//! 7. synthesize the program and write it to `<root>/matte/app.go`
//! 8. compile it with the Go toolchain, unless asked not to
//!
//! Any failure stops the run; the scratch directory only exists again once
//! step 7 succeeded.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MatteError, Result};
use crate::frameworks::{configure_frameworks, extract_general_api_info, Frameworks, DEFAULT_KINDS};
use crate::generator::{build_program, clean_scratch_dir, synthesize, write_program};
use crate::project::{
    check_go_version, load_project, load_project_config, resolve_module_path, SCRATCH_DIR,
};
use crate::registry::{process_project, RegisteredHandler};
use crate::runtime_config::RuntimeConfig;

/// Default name of the compiled binary inside the scratch directory.
pub const DEFAULT_OUTPUT: &str = "app";

/// Default Go toolchain binary.
pub const DEFAULT_GO_BIN: &str = "go";

/// Inputs of one `build` run. `None` fields fall back to the environment,
/// then `matte.toml`, then the defaults.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Project root holding `go.mod`
    pub project_dir: PathBuf,
    /// Stop after writing the program
    pub no_build: bool,
    /// Go toolchain binary
    pub go_bin: Option<String>,
    /// Name of the compiled binary
    pub output: Option<String>,
    /// Framework kinds in first-match order
    pub frameworks: Option<Vec<String>>,
    /// Directory searched by `@Description.markdown`
    pub markdown_dir: Option<PathBuf>,
}

impl BuildOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }
}

/// What a successful `build` produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path of the synthesized `app.go`
    pub program_path: PathBuf,
    /// Compiled binary, absent with `no_build`
    pub binary: Option<PathBuf>,
    /// Every handler that was bound
    pub handlers: Vec<RegisteredHandler>,
}

/// Run the whole pipeline for one project.
pub fn run_build(options: &BuildOptions) -> Result<BuildReport> {
    let root = options.project_dir.as_path();
    let module_path = resolve_module_path(root)?;
    let (major, minor) = check_go_version(root)?;
    info!(
        root = %root.display(),
        module = %module_path,
        go = %format!("{major}.{minor}"),
        "building project"
    );

    let scratch_dir = root.join(SCRATCH_DIR);
    clean_scratch_dir(&scratch_dir)?;

    let config = load_project_config(root)?.unwrap_or_default();
    let kinds = options
        .frameworks
        .clone()
        .or(config.frameworks.enabled)
        .unwrap_or_else(|| DEFAULT_KINDS.iter().map(|k| k.to_string()).collect());
    let mut frameworks = Frameworks::from_kinds(&kinds)?;
    debug!(frameworks = ?kinds, "frameworks enabled");

    let project = load_project(root, SCRATCH_DIR)?;
    info!(packages = project.packages.len(), "packages loaded");

    let values = extract_general_api_info(&project)?;
    configure_frameworks(&mut frameworks, &values)?;

    let markdown_dir = options
        .markdown_dir
        .clone()
        .or_else(|| config.build.markdown_dir.as_ref().map(|dir| root.join(dir)));
    let handlers = process_project(&project, &mut frameworks, markdown_dir.as_deref())?;

    let source = synthesize(&frameworks, &module_path)?;
    let program_path = write_program(&scratch_dir, &source)?;

    if options.no_build {
        info!(program = %program_path.display(), "compilation skipped");
        return Ok(BuildReport {
            program_path,
            binary: None,
            handlers,
        });
    }

    let runtime = RuntimeConfig::from_env();
    let go_bin = options
        .go_bin
        .clone()
        .or(runtime.go_bin)
        .or(config.build.go)
        .unwrap_or_else(|| DEFAULT_GO_BIN.to_string());
    let output = options
        .output
        .clone()
        .or(config.build.output)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let binary = build_program(&go_bin, &scratch_dir, &output)?;
    info!(binary = %binary.display(), "build finished");
    Ok(BuildReport {
        program_path,
        binary: Some(binary),
        handlers,
    })
}

/// Check that `project_dir` is a Go module matte can work on, declaring a
/// module path and a recent enough `go` directive, and return its module path.
pub fn configure(project_dir: &Path) -> Result<String> {
    if !project_dir.is_dir() {
        return Err(MatteError::Configuration(format!(
            "{} is not a directory",
            project_dir.display()
        )));
    }
    let module_path = resolve_module_path(project_dir)?;
    check_go_version(project_dir)?;
    info!(root = %project_dir.display(), module = %module_path, "project configured");
    Ok(module_path)
}
