//! # Frameworks Module
//!
//! A framework adapts annotated handlers to one serving technology. Each
//! instance decides whether a function has the handler shape it serves,
//! accumulates route bindings and finally renders the bootstrap function that
//! starts its server inside the synthesized program.
//!
//! ## Variants
//!
//! - [`HttpFramework`] (`http`): `func(w http.ResponseWriter, r *http.Request)`
//!   handlers registered directly on a `ServeMux`, default address `:8000`
//! - [`ParamsFramework`] (`params`): handlers taking named, typed request
//!   values such as `func(id int, name *string)`, wrapped in generated
//!   verification code, default address `:8001`
//!
//! ## Dispatch
//!
//! [`Frameworks`] keeps instances in configuration order and hands a function
//! to the **first** one whose shape matches. Reordering the list can change
//! which framework claims a function both would accept.

mod config;
mod mux;
mod net_http;
mod params;

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::error::{MatteError, Result};
use crate::handler::{HandlerRef, ParamDescriptor, Route, RouteBinding};
use crate::syntax::Signature;

pub use config::{
    configure_frameworks, extract_general_api_info, ConfigField, ConfigValue,
    GENERAL_API_INFO,
};
pub use net_http::HttpFramework;
pub use params::ParamsFramework;

/// Framework kinds selectable by name, in default configuration order.
pub const DEFAULT_KINDS: [&str; 2] = ["http", "params"];

/// One `import` of the synthesized program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoImport {
    /// Import path
    pub path: String,
    /// Name the package is referred to by
    pub name: String,
}

impl GoImport {
    /// Standard library import; its name is the last path element.
    pub fn std(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
        }
    }
}

/// Source a framework contributes to the synthesized program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    /// Imports the bootstrap body needs
    pub imports: Vec<GoImport>,
    /// Name of the bootstrap function
    pub function_name: String,
    /// Full `func ... { ... }` source
    pub body: String,
}

/// A pluggable serving technology.
pub trait Framework: fmt::Debug {
    /// Short name used in `matte.toml` and logs.
    fn kind(&self) -> &str;

    /// Name of the generated bootstrap function; unique per [`Frameworks`].
    fn bootstrap_name(&self) -> &str;

    /// Check a function's parameter list against the handler shape.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` naming the first position that does not fit.
    fn matches(&self, signature: &Signature) -> Result<()>;

    /// Parameter descriptors the generated registration needs for a matched
    /// signature. Frameworks that pass the request through untouched need none.
    fn describe_params(&self, _signature: &Signature) -> Result<Vec<ParamDescriptor>> {
        Ok(Vec::new())
    }

    /// Record that `handler` serves `route`.
    ///
    /// # Errors
    ///
    /// `DuplicateRoute` if the path is already bound on this instance.
    fn bind(&mut self, route: &Route, handler: &HandlerRef) -> Result<()>;

    /// Apply a configuration value returned by the general API info function.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the value is not the shape this framework expects.
    fn configure(&mut self, value: &ConfigValue) -> Result<()>;

    /// Whether [`Framework::configure`] succeeded.
    fn is_configured(&self) -> bool;

    /// Bindings recorded so far, in bind order.
    fn bindings(&self) -> &[RouteBinding];

    /// Only active frameworks are synthesized.
    fn is_active(&self) -> bool {
        self.is_configured() || !self.bindings().is_empty()
    }

    /// Render the bootstrap function.
    fn finalize(&self) -> Result<Bootstrap>;
}

/// Framework instances in configuration (and first-match) order.
#[derive(Debug)]
pub struct Frameworks {
    items: Vec<Box<dyn Framework>>,
}

impl Frameworks {
    /// Build the list, rejecting duplicate bootstrap function names.
    pub fn new(items: Vec<Box<dyn Framework>>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for framework in &items {
            if !names.insert(framework.bootstrap_name().to_string()) {
                return Err(MatteError::Configuration(format!(
                    "bootstrap function {} is generated by more than one framework",
                    framework.bootstrap_name()
                )));
            }
        }
        Ok(Self { items })
    }

    /// Instantiate frameworks by kind name.
    pub fn from_kinds<S: AsRef<str>>(kinds: &[S]) -> Result<Self> {
        let items = kinds
            .iter()
            .map(|kind| framework_for_kind(kind.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(items)
    }

    /// The frameworks in [`DEFAULT_KINDS`] order.
    pub fn default_set() -> Self {
        Self {
            items: vec![
                Box::new(HttpFramework::new()),
                Box::new(ParamsFramework::new()),
            ],
        }
    }

    /// First framework whose handler shape accepts `signature`.
    pub fn framework_for(&mut self, signature: &Signature) -> Option<&mut dyn Framework> {
        for framework in self.items.iter_mut() {
            match framework.matches(signature) {
                Ok(()) => return Some(framework.as_mut()),
                Err(err) => debug!(framework = framework.kind(), reason = %err, "shape rejected"),
            }
        }
        None
    }

    /// Frameworks in first-match order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Framework> {
        self.items.iter().map(|f| f.as_ref())
    }

    /// Frameworks in first-match order, for configuration and binding.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Framework>> {
        self.items.iter_mut()
    }

    /// Number of enabled frameworks.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no framework is enabled.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn framework_for_kind(kind: &str) -> Result<Box<dyn Framework>> {
    match kind {
        "http" => Ok(Box::new(HttpFramework::new())),
        "params" => Ok(Box::new(ParamsFramework::new())),
        other => Err(MatteError::Configuration(format!(
            "unknown framework '{other}', expected one of {}",
            DEFAULT_KINDS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::syntax::{ParamField, TypeExpr};

    fn sig(fields: &[(&str, TypeExpr)]) -> Signature {
        Signature {
            params: fields
                .iter()
                .map(|(name, ty)| ParamField {
                    names: vec![name.to_string()],
                    ty: ty.clone(),
                })
                .collect(),
        }
    }

    fn local_http_shape() -> Signature {
        sig(&[
            ("w", TypeExpr::Ident("ResponseWriter".into())),
            (
                "r",
                TypeExpr::Pointer(Box::new(TypeExpr::Ident("Request".into()))),
            ),
        ])
    }

    #[test]
    fn test_first_match_wins() {
        let mut frameworks = Frameworks::from_kinds(&["http", "params"]).unwrap();
        assert_eq!(
            frameworks.framework_for(&local_http_shape()).unwrap().kind(),
            "http"
        );
        let mut reversed = Frameworks::from_kinds(&["params", "http"]).unwrap();
        assert_eq!(
            reversed.framework_for(&local_http_shape()).unwrap().kind(),
            "params"
        );
    }

    #[test]
    fn test_iteration_follows_enabled_order() {
        let mut frameworks = Frameworks::from_kinds(&["params", "http"]).unwrap();
        assert_eq!(frameworks.len(), 2);
        assert!(!frameworks.is_empty());
        let kinds: Vec<&str> = frameworks.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec!["params", "http"]);
        assert_eq!(frameworks.iter_mut().count(), 2);
        assert!(Frameworks::from_kinds(&[] as &[&str]).unwrap().is_empty());
    }

    #[test]
    fn test_no_framework_matches() {
        let mut frameworks = Frameworks::default_set();
        let variadic = sig(&[("xs", TypeExpr::Other("...int".into()))]);
        assert!(frameworks.framework_for(&variadic).is_none());
        assert!(frameworks.framework_for(&Signature::default()).is_none());
    }

    #[test]
    fn test_unknown_kind_is_configuration_error() {
        let err = Frameworks::from_kinds(&["gin"]).unwrap_err();
        assert!(matches!(err, MatteError::Configuration(m) if m.contains("gin")));
    }

    #[test]
    fn test_duplicate_bootstrap_names_rejected() {
        let err = Frameworks::from_kinds(&["http", "http"]).unwrap_err();
        assert!(matches!(err, MatteError::Configuration(m) if m.contains("RunHttpServer")));
    }

    #[test]
    fn test_std_import_name() {
        assert_eq!(GoImport::std("net/http").name, "http");
        assert_eq!(GoImport::std("errors").name, "errors");
    }
}
