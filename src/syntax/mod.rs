//! # Syntax Module
//!
//! Turns Go source files into the small, owned syntax model the rest of the
//! pipeline works on. Parsing is delegated to `tree-sitter-go`; this module
//! only keeps what handler discovery needs: the package clause, imports,
//! function declarations with their doc comments and parameter lists, and
//! the values returned by each function body.
//!
//! It also reads the module path and language version out of `go.mod` and
//! decodes Go literals.

mod gomod;
pub mod literal;
mod parse;
mod types;

pub use gomod::{parse_go_version, parse_module_path};
pub use parse::{parse_file, parse_source};
pub use types::*;
