use http::Method;

use crate::error::{MatteError, Result};
use crate::syntax::{Signature, TypeExpr};

use super::{is_predeclared, ParamDescriptor, ParamSource, Route};

/// Methods a route annotation may name.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::HEAD,
];

/// Parse a method name case-insensitively, accepting only [`SUPPORTED_METHODS`].
pub fn parse_method(text: &str) -> Result<Method> {
    let upper = text.trim().to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| MatteError::InvalidMethod(text.trim().to_string()))
}

/// Build a [`Route`] from annotation text.
pub fn parse_route(method: &str, path: &str) -> Result<Route> {
    let method = parse_method(method)?;
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(MatteError::DecoratorSyntax(format!(
            "route path '{path}' must start with '/'"
        )));
    }
    Ok(Route {
        method,
        path: path.to_string(),
    })
}

/// Derive parameter descriptors from a signature.
///
/// Every parameter must be named and typed as an identifier or a pointer to
/// one; pointers mark the parameter optional. Identifiers other than the
/// predeclared types must be exported, since the generated program refers to
/// them from outside their package.
pub fn params_from_signature(signature: &Signature) -> Result<Vec<ParamDescriptor>> {
    signature
        .positions()
        .into_iter()
        .enumerate()
        .map(|(index, (name, ty))| {
            let name = name.ok_or_else(|| {
                MatteError::ShapeMismatch(format!("parameter {index} has no name"))
            })?;
            if !is_plain_or_pointer_ident(ty) {
                return Err(MatteError::ShapeMismatch(format!(
                    "parameter {index} ({name}) has type {ty}, expected an identifier or pointer to one"
                )));
            }
            if let Some(local) = unexported_type(ty) {
                return Err(MatteError::ShapeMismatch(format!(
                    "parameter {index} ({name}) has unexported type {local}, which the generated program cannot refer to"
                )));
            }
            Ok(ParamDescriptor {
                name: name.to_string(),
                ty: ty.clone(),
                required: !ty.is_pointer(),
                source: ParamSource::Auto,
            })
        })
        .collect()
}

fn is_plain_or_pointer_ident(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Ident(_) => true,
        TypeExpr::Pointer(inner) => matches!(**inner, TypeExpr::Ident(_)),
        _ => false,
    }
}

fn unexported_type(ty: &TypeExpr) -> Option<&str> {
    let name = ty.simple_name()?;
    let exported = name.chars().next().is_some_and(char::is_uppercase);
    (!exported && !is_predeclared(name)).then_some(name)
}
