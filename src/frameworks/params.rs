use crate::error::{MatteError, Result};
use crate::generator::verifier::{needs_json, render_verifying_registration};
use crate::handler::{params_from_signature, HandlerRef, ParamDescriptor, Route, RouteBinding};
use crate::syntax::Signature;

use super::mux::MuxState;
use super::{Bootstrap, ConfigValue, Framework};

/// Handlers that take named request values, e.g. `func(id int, name *string)`.
///
/// Each value is read from the request by parameter name and decoded before
/// the handler is called; pointer parameters are optional.
#[derive(Debug)]
pub struct ParamsFramework {
    mux: MuxState,
    needs_json: bool,
}

impl ParamsFramework {
    pub const KIND: &'static str = "params";
    pub const BOOTSTRAP: &'static str = "RunParamsServer";
    pub const CONFIG_TYPE: &'static str = "ParamsConfig";
    pub const DEFAULT_ADDR: &'static str = ":8001";

    pub fn new() -> Self {
        Self {
            mux: MuxState::new(Self::DEFAULT_ADDR),
            needs_json: false,
        }
    }
}

impl Default for ParamsFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl Framework for ParamsFramework {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn bootstrap_name(&self) -> &str {
        Self::BOOTSTRAP
    }

    fn matches(&self, signature: &Signature) -> Result<()> {
        if signature.arity() == 0 {
            return Err(MatteError::ShapeMismatch(
                "handler should take at least one param".to_string(),
            ));
        }
        params_from_signature(signature).map(|_| ())
    }

    fn describe_params(&self, signature: &Signature) -> Result<Vec<ParamDescriptor>> {
        params_from_signature(signature)
    }

    fn bind(&mut self, route: &Route, handler: &HandlerRef) -> Result<()> {
        let registration = render_verifying_registration(route, handler)?;
        self.mux.claim(route, handler, registration)?;
        self.needs_json |= needs_json(&handler.params);
        Ok(())
    }

    fn configure(&mut self, value: &ConfigValue) -> Result<()> {
        self.mux.configure_addr(Self::KIND, Self::CONFIG_TYPE, value)
    }

    fn is_configured(&self) -> bool {
        self.mux.is_configured()
    }

    fn bindings(&self) -> &[RouteBinding] {
        self.mux.bindings()
    }

    fn finalize(&self) -> Result<Bootstrap> {
        let extra: &[&str] = if self.needs_json {
            &["encoding/json"]
        } else {
            &[]
        };
        self.mux.render(Self::BOOTSTRAP, extra)
    }
}
