//! # Handler Registry
//!
//! Walks every package of a loaded project and registers each annotated
//! function with the first framework whose handler shape it matches.
//!
//! A function is offered to the frameworks when it is a top-level,
//! receiver-less declaration with a doc comment. Functions no framework
//! accepts, and documented functions without any recognized annotation, are
//! skipped silently. The general API info function of the root package is
//! never a handler.

use std::path::Path;

use tracing::{debug, error, info};

use crate::annotations::parse_doc;
use crate::error::{MatteError, Result};
use crate::frameworks::{Frameworks, GENERAL_API_INFO};
use crate::handler::{HandlerRef, Route};
use crate::project::{Package, Project};
use crate::syntax::{FuncDecl, GoFile};

/// Summary of one bound handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredHandler {
    /// Kind of the framework that claimed the handler
    pub framework: String,
    /// `import/path.Name`
    pub handler: String,
    /// Routes bound, in annotation order
    pub routes: Vec<Route>,
}

/// Register every handler of `project`, package by package in load order and
/// function by function in source order.
///
/// `markdown_dir` is where `@Description.markdown` looks for files.
pub fn process_project(
    project: &Project,
    frameworks: &mut Frameworks,
    markdown_dir: Option<&Path>,
) -> Result<Vec<RegisteredHandler>> {
    let mut registered = Vec::new();
    for (index, package) in project.packages.iter().enumerate() {
        let is_root = index == 0;
        for (file, func) in package.functions() {
            if func.has_receiver || func.doc.is_none() {
                continue;
            }
            if is_root && func.name == GENERAL_API_INFO {
                continue;
            }
            let outcome = process_function(package, func, frameworks, markdown_dir);
            match outcome {
                Ok(Some(handler)) => registered.push(handler),
                Ok(None) => {}
                Err(err) => {
                    error!(
                        file = %file.path.display(),
                        line = func.line,
                        function = %func.name,
                        error = %err,
                        "failed to register handler"
                    );
                    return Err(located(file, func, err));
                }
            }
        }
    }
    info!(handlers = registered.len(), "handlers registered");
    Ok(registered)
}

/// Offer one function to the frameworks.
///
/// Returns `Ok(None)` when the function is not a handler: it is a method, no
/// framework accepts its parameter list, or its doc comment carries no
/// recognized annotation.
///
/// # Errors
///
/// - `MissingAnnotation` when a matched function has no doc comment, or an
///   annotation but no route
/// - `Configuration` when the handler lives in package `main`
/// - any annotation grammar error, and `DuplicateRoute` from binding
pub fn process_function(
    package: &Package,
    func: &FuncDecl,
    frameworks: &mut Frameworks,
    markdown_dir: Option<&Path>,
) -> Result<Option<RegisteredHandler>> {
    if func.has_receiver {
        return Ok(None);
    }
    let Some(framework) = frameworks.framework_for(&func.signature) else {
        debug!(function = %func.name, package = %package.import_path, "no framework matches");
        return Ok(None);
    };

    let mut handler = HandlerRef {
        import_path: package.import_path.clone(),
        package_name: package.name.clone(),
        name: func.name.clone(),
        params: framework.describe_params(&func.signature)?,
    };

    let Some(doc) = &func.doc else {
        return Err(MatteError::MissingAnnotation {
            handler: handler.qualified_name(),
            reason: "handlers need a doc comment with route annotations".to_string(),
        });
    };
    let annotations = parse_doc(doc, markdown_dir)?;
    if !annotations.recognized {
        debug!(handler = %handler.qualified_name(), "no annotations, skipped");
        return Ok(None);
    }
    if package.name == "main" {
        return Err(MatteError::Configuration(format!(
            "handler {} is declared in package main, which the generated program cannot import",
            handler.qualified_name()
        )));
    }

    annotations.apply_param_sources(&mut handler);
    let routes = annotations.routes_for(&handler)?.to_vec();
    for route in &routes {
        framework.bind(route, &handler)?;
        info!(
            framework = framework.kind(),
            route = %route,
            handler = %handler.call_expr(),
            "handler bound"
        );
    }
    Ok(Some(RegisteredHandler {
        framework: framework.kind().to_string(),
        handler: handler.qualified_name(),
        routes,
    }))
}

/// Prefix grammar errors with the function's location; other errors already
/// name what they are about.
fn located(file: &GoFile, func: &FuncDecl, err: MatteError) -> MatteError {
    let at = format!("{}:{} ({})", file.path.display(), func.line, func.name);
    match err {
        MatteError::DecoratorSyntax(message) => MatteError::DecoratorSyntax(format!("{at}: {message}")),
        MatteError::Annotation { line, message } => MatteError::Annotation {
            line,
            message: format!("{at}: {message}"),
        },
        other => other,
    }
}
