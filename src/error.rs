//! Error taxonomy shared by every pipeline stage.
//!
//! Each stage fails fast and hands the first error to its caller; nothing is
//! retried. The binary prints the error's `Display` text and exits non-zero.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MatteError>;

/// Every way a `matte build` run can fail.
#[derive(Debug, Error)]
pub enum MatteError {
    /// Missing or invalid `go.mod`, missing general info function, bad `matte.toml`.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Go source could not be parsed.
    #[error("parse error in {}:{line}:{column}: {message}", file.display())]
    Parse {
        /// File that failed to parse
        file: PathBuf,
        /// 1-based line of the first syntax error
        line: usize,
        /// 1-based column of the first syntax error
        column: usize,
        /// What went wrong
        message: String,
    },

    /// A `@name(args)` decorator is malformed.
    #[error("invalid decorator: {0}")]
    DecoratorSyntax(String),

    /// A route annotation names an HTTP method that is not supported.
    #[error("invalid http method '{0}', expected one of GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD")]
    InvalidMethod(String),

    /// An extended-grammar annotation line is malformed.
    #[error("invalid annotation '{line}': {message}")]
    Annotation {
        /// Comment line as written
        line: String,
        /// What went wrong
        message: String,
    },

    /// A handler signature does not fit a framework's reference shape.
    #[error("signature mismatch: {0}")]
    ShapeMismatch(String),

    /// A framework received a configuration value of the wrong shape.
    #[error("configuration type mismatch: {0}")]
    TypeMismatch(String),

    /// Two handlers claimed the same path within one framework instance.
    #[error("path {path} is already registered for handler {previous} so cannot register it with handler {handler} again")]
    DuplicateRoute {
        /// The contested path
        path: String,
        /// Fully-qualified handler that owns the path
        previous: String,
        /// Fully-qualified handler that tried to claim it
        handler: String,
    },

    /// A function matches a framework shape but carries no usable route metadata.
    #[error("handler {handler} has no usable route annotation: {reason}")]
    MissingAnnotation {
        /// Fully-qualified handler name
        handler: String,
        /// Why the annotations were rejected
        reason: String,
    },

    /// Filesystem or process spawning failure.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The external compiler rejected the synthesized program.
    #[error("build failed:\n{diagnostics}")]
    Build {
        /// Compiler diagnostics, verbatim
        diagnostics: String,
    },

    /// A code template failed to render.
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

impl MatteError {
    /// Wrap an I/O error with the operation that failed.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        MatteError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O error raised while touching `path`.
    pub(crate) fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        MatteError::io(format!("unable to {action} {}", path.display()), source)
    }

    pub(crate) fn annotation(line: &str, message: impl Into<String>) -> Self {
        MatteError::Annotation {
            line: line.to_string(),
            message: message.into(),
        }
    }
}
