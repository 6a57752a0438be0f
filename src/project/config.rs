//! Optional per-project settings read from `matte.toml` at the project root.
//!
//! ```toml
//! [build]
//! go = "go"
//! output = "app"
//! markdown_dir = "docs"
//!
//! [frameworks]
//! enabled = ["http", "params"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MatteError, Result};

/// File name looked up at the project root.
pub const PROJECT_CONFIG_FILE: &str = "matte.toml";

/// Contents of `matte.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Compiler settings
    #[serde(default)]
    pub build: BuildSection,
    /// Framework selection
    #[serde(default)]
    pub frameworks: FrameworksSection,
}

/// `[build]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Go toolchain binary
    pub go: Option<String>,
    /// Name of the compiled binary written into the scratch directory
    pub output: Option<String>,
    /// Directory, relative to the project root, searched by `@Description.markdown`
    pub markdown_dir: Option<String>,
}

/// `[frameworks]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FrameworksSection {
    /// Framework kinds in first-match order
    pub enabled: Option<Vec<String>>,
}

/// Load `matte.toml` from `root`.
///
/// Returns `Ok(None)` when the file does not exist and an error when it exists
/// but cannot be read or parsed.
pub fn load_project_config(root: &Path) -> Result<Option<ProjectConfig>> {
    let path = root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| MatteError::io_at("read", &path, e))?;
    let config = toml::from_str(&contents).map_err(|e| {
        MatteError::Configuration(format!("failed to parse {}: {e}", path.display()))
    })?;
    Ok(Some(config))
}
