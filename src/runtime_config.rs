//! # Runtime Configuration Module
//!
//! Environment variables read once at startup.
//!
//! ## Environment Variables
//!
//! ### `MATTE_GO_BIN`
//!
//! Go toolchain binary used to compile the synthesized program. Takes
//! precedence over `[build] go` in `matte.toml`.
//!
//! Default: `go` (looked up on `PATH`)
//!
//! ### `MATTE_LOG`
//!
//! `tracing-subscriber` filter directive for the `matte` binary, e.g.
//! `matte=debug` or `warn`.
//!
//! Default: `info`
//!
//! ## Usage
//!
//! ```rust
//! use matte::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("compiler: {}", config.go_bin_or("go"));
//! ```

use std::env;

/// Variable naming the Go toolchain binary.
pub const GO_BIN_VAR: &str = "MATTE_GO_BIN";

/// Variable holding the log filter.
pub const LOG_VAR: &str = "MATTE_LOG";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Compiler override from `MATTE_GO_BIN`
    pub go_bin: Option<String>,
    /// Filter directive from `MATTE_LOG`
    pub log_filter: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        RuntimeConfig {
            go_bin: non_empty(GO_BIN_VAR),
            log_filter: non_empty(LOG_VAR),
        }
    }

    /// The compiler override, or `fallback`.
    pub fn go_bin_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.go_bin.as_deref().unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.go_bin_or("go"), "go");
    }

    #[test]
    fn test_reads_variables() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (GO_BIN_VAR, "/opt/go/bin/go"),
            (LOG_VAR, "matte=debug"),
        ]));
        assert_eq!(config.go_bin_or("go"), "/opt/go/bin/go");
        assert_eq!(config.log_filter.as_deref(), Some("matte=debug"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[(GO_BIN_VAR, "  ")]));
        assert_eq!(config.go_bin, None);
    }
}
