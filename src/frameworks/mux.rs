use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{MatteError, Result};
use crate::generator::templates::{render_fragment, BootstrapTemplate};
use crate::handler::{HandlerRef, Route, RouteBinding};
use crate::syntax::literal::{quote, unquote};

use super::{Bootstrap, ConfigValue, GoImport};

/// Binding table and bootstrap rendering shared by every framework that
/// serves through a `net/http` `ServeMux`.
#[derive(Debug)]
pub(crate) struct MuxState {
    default_addr: &'static str,
    addr: Option<String>,
    bindings: Vec<RouteBinding>,
    /// path with wildcard names erased → fully-qualified handler that claimed it
    claimed: BTreeMap<String, String>,
    registrations: Vec<String>,
    /// import path → package name
    imports: BTreeMap<String, String>,
}

impl MuxState {
    pub(crate) fn new(default_addr: &'static str) -> Self {
        Self {
            default_addr,
            addr: None,
            bindings: Vec::new(),
            claimed: BTreeMap::new(),
            registrations: Vec::new(),
            imports: BTreeMap::new(),
        }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.addr.is_some()
    }

    pub(crate) fn addr(&self) -> &str {
        self.addr.as_deref().unwrap_or(self.default_addr)
    }

    pub(crate) fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    /// Accept a `<config_type>{Addr: "..."}` value.
    pub(crate) fn configure_addr(
        &mut self,
        kind: &str,
        config_type: &str,
        value: &ConfigValue,
    ) -> Result<()> {
        if value.type_name != config_type {
            return Err(MatteError::TypeMismatch(format!(
                "{kind} framework expects a {config_type} value, got {}",
                value.type_name
            )));
        }
        if self.is_configured() {
            return Err(MatteError::Configuration(format!(
                "{kind} framework is already configured"
            )));
        }
        let mut addr = self.default_addr.to_string();
        for field in &value.fields {
            match field.key.as_str() {
                "Addr" => {
                    addr = unquote(&field.literal).ok_or_else(|| {
                        MatteError::TypeMismatch(format!(
                            "{config_type}.Addr must be a string literal, got {}",
                            field.literal
                        ))
                    })?;
                }
                other => {
                    return Err(MatteError::TypeMismatch(format!(
                        "{config_type} has no field {other}"
                    )))
                }
            }
        }
        debug!(framework = kind, addr = %addr, "framework configured");
        self.addr = Some(addr);
        Ok(())
    }

    /// Claim `route.path` for `handler` and record its registration statement.
    ///
    /// Paths differing only in wildcard names (`/items/{id}`, `/items/{name}`)
    /// are the same path to the mux. Fails without touching any state when the
    /// path is already claimed or is not a valid mux pattern.
    pub(crate) fn claim(
        &mut self,
        route: &Route,
        handler: &HandlerRef,
        registration: String,
    ) -> Result<()> {
        let key = pattern_key(&route.path)?;
        let qualified = handler.qualified_name();
        if let Some(previous) = self.claimed.get(&key) {
            return Err(MatteError::DuplicateRoute {
                path: route.path.clone(),
                previous: previous.clone(),
                handler: qualified,
            });
        }
        self.claimed.insert(key, qualified);
        self.imports
            .insert(handler.import_path.clone(), handler.package_name.clone());
        self.registrations.push(registration);
        self.bindings.push(RouteBinding {
            route: route.clone(),
            handler: handler.clone(),
        });
        Ok(())
    }

    pub(crate) fn render(&self, function_name: &str, extra_std: &[&str]) -> Result<Bootstrap> {
        let body = render_fragment(&BootstrapTemplate {
            function_name: function_name.to_string(),
            addr: quote(self.addr()),
            registrations: self.registrations.clone(),
        })?;
        let mut imports: Vec<GoImport> = ["context", "errors", "net/http"]
            .iter()
            .chain(extra_std)
            .map(|path| GoImport::std(path))
            .collect();
        imports.extend(self.imports.iter().map(|(path, name)| GoImport {
            path: path.clone(),
            name: name.clone(),
        }));
        Ok(Bootstrap {
            imports,
            function_name: function_name.to_string(),
            body,
        })
    }
}

/// Check `path` against the `ServeMux` wildcard rules and erase wildcard names.
///
/// `{name}` becomes `{}` and `{name...}` becomes `{...}`; `{$}` is kept.
fn pattern_key(path: &str) -> Result<String> {
    let invalid = |reason: String| MatteError::DecoratorSyntax(format!("route path '{path}' {reason}"));
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;
    let mut names: Vec<&str> = Vec::new();
    let mut key = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        if !segment.contains(['{', '}']) {
            key.push(segment.to_string());
            continue;
        }
        let inner = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .filter(|inner| !inner.contains(['{', '}']))
            .ok_or_else(|| invalid(format!("has a malformed wildcard segment '{segment}'")))?;
        if inner == "$" {
            if index != last {
                return Err(invalid("may only use {$} at the end".to_string()));
            }
            key.push("{$}".to_string());
            continue;
        }
        let (name, rest) = match inner.strip_suffix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if rest && index != last {
            return Err(invalid(format!("may only use '{{{inner}}}' as the final segment")));
        }
        if !is_go_identifier(name) {
            return Err(invalid(format!("has a wildcard '{name}' that is not a Go identifier")));
        }
        if names.contains(&name) {
            return Err(invalid(format!("repeats the wildcard '{name}'")));
        }
        names.push(name);
        key.push(if rest { "{...}" } else { "{}" }.to_string());
    }
    Ok(key.join("/"))
}

fn is_go_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
