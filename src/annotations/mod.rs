//! # Annotations Module
//!
//! Reads route and parameter metadata out of a handler's doc comment. Two
//! grammars coexist, one comment line at a time:
//!
//! - decorators: `@path("GET", "/hello")`
//! - swag-style attributes: `@Router /hello [get]`, `@Param name query string true "desc"`
//!
//! A doc comment with no recognized annotation of either grammar does not
//! describe a handler.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let annotations = parse_doc(&doc, None)?;
//! if annotations.recognized {
//!     for route in annotations.routes_for(&handler)? { /* bind */ }
//! }
//! ```

mod decorator;
pub mod swag;

use std::collections::BTreeMap;
use std::path::Path;

pub use decorator::{
    is_decorator_line, parse_decorator, parse_decorator_line, Decorator, KNOWN_DECORATORS,
};
pub use swag::{parse_comment_line, Operation};

use crate::error::{MatteError, Result};
use crate::handler::{parse_route, HandlerRef, ParamSource, Route};
use crate::syntax::CommentGroup;

/// Everything the annotations of one doc comment say about a function.
#[derive(Debug, Clone, Default)]
pub struct HandlerAnnotations {
    /// Whether any line used a recognized annotation
    pub recognized: bool,
    /// Decorators in comment order
    pub(crate) decorators: Vec<Decorator>,
    /// Swag-style operation metadata
    pub operation: Operation,
    /// Routes from `@path` decorators followed by `@Router` lines
    pub routes: Vec<Route>,
    /// Request locations declared with `@Param`, keyed by parameter name
    pub param_sources: BTreeMap<String, ParamSource>,
}

impl HandlerAnnotations {
    /// Routes of a function that is being bound as a handler.
    ///
    /// A recognized annotation without any route is an error: the function
    /// asked to be a handler but said nowhere how to reach it.
    pub fn routes_for(&self, handler: &HandlerRef) -> Result<&[Route]> {
        if self.routes.is_empty() {
            return Err(MatteError::MissingAnnotation {
                handler: handler.qualified_name(),
                reason: "a 'path' decorator or '@Router' annotation is required".to_string(),
            });
        }
        Ok(&self.routes)
    }

    /// Apply the declared request locations to `handler`'s parameters.
    pub fn apply_param_sources(&self, handler: &mut HandlerRef) {
        for param in &mut handler.params {
            if let Some(source) = self.param_sources.get(&param.name) {
                param.source = *source;
            }
        }
    }
}

/// Parse a doc comment with both grammars.
///
/// `markdown_dir` is where `@Description.markdown` looks for files.
pub fn parse_doc(doc: &CommentGroup, markdown_dir: Option<&Path>) -> Result<HandlerAnnotations> {
    let mut out = HandlerAnnotations::default();
    for line in &doc.lines {
        let text = line.trim();
        if is_decorator_line(text) {
            let decorators = parse_decorator_line(text)?;
            out.recognized |= !decorators.is_empty();
            out.decorators.extend(decorators);
        } else {
            out.recognized |= parse_comment_line(&mut out.operation, text, markdown_dir)?;
        }
    }

    for decorator in out.decorators.iter().filter(|d| d.name == "path") {
        let [method, path] = decorator.args.as_slice() else {
            return Err(MatteError::DecoratorSyntax(format!(
                "path decorator must have two args, found {}",
                decorator.args.len()
            )));
        };
        out.routes.push(parse_route(method, path)?);
    }
    out.routes.extend(out.operation.routes.iter().cloned());

    for param in &out.operation.params {
        let source = match param.location.as_str() {
            "path" => ParamSource::Path,
            "query" => ParamSource::Query,
            "header" => ParamSource::Header,
            _ => continue,
        };
        out.param_sources.insert(param.name.clone(), source);
    }
    Ok(out)
}
