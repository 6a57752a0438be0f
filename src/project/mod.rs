//! # Project Module
//!
//! Resolves the module path from `go.mod`, walks the project directory tree
//! breadth-first into [`Package`] records and reads the optional
//! `matte.toml` project settings.

mod config;
mod load;

pub use config::{
    load_project_config, BuildSection, FrameworksSection, ProjectConfig, PROJECT_CONFIG_FILE,
};
pub use load::{
    check_go_version, import_path_for, load_project, resolve_module_path, Package, Project,
    MANIFEST_FILE, MIN_GO_VERSION, SCRATCH_DIR,
};
