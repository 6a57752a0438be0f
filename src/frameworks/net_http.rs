use crate::error::{MatteError, Result};
use crate::handler::{HandlerRef, Route, RouteBinding};
use crate::generator::verifier::mux_pattern;
use crate::syntax::{ParamField, Signature, TypeExpr};

use super::mux::MuxState;
use super::{Bootstrap, ConfigValue, Framework};

/// Plain `net/http` handlers: `func(w http.ResponseWriter, r *http.Request)`.
#[derive(Debug)]
pub struct HttpFramework {
    shape: Signature,
    mux: MuxState,
}

impl HttpFramework {
    pub const KIND: &'static str = "http";
    pub const BOOTSTRAP: &'static str = "RunHttpServer";
    pub const CONFIG_TYPE: &'static str = "HttpConfig";
    pub const DEFAULT_ADDR: &'static str = ":8000";

    pub fn new() -> Self {
        Self {
            shape: reference_shape(),
            mux: MuxState::new(Self::DEFAULT_ADDR),
        }
    }
}

impl Default for HttpFramework {
    fn default() -> Self {
        Self::new()
    }
}

fn reference_shape() -> Signature {
    let qualified = |name: &str| TypeExpr::Qualified {
        package: "http".to_string(),
        name: name.to_string(),
    };
    Signature {
        params: vec![
            ParamField {
                names: vec!["w".to_string()],
                ty: qualified("ResponseWriter"),
            },
            ParamField {
                names: vec!["r".to_string()],
                ty: TypeExpr::Pointer(Box::new(qualified("Request"))),
            },
        ],
    }
}

impl Framework for HttpFramework {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn bootstrap_name(&self) -> &str {
        Self::BOOTSTRAP
    }

    fn matches(&self, signature: &Signature) -> Result<()> {
        let expected = self.shape.positions();
        let actual = signature.positions();
        if expected.len() != actual.len() {
            return Err(MatteError::ShapeMismatch(format!(
                "handler should take {} params, found {}",
                expected.len(),
                actual.len()
            )));
        }
        for (index, ((_, want), (_, got))) in expected.iter().zip(&actual).enumerate() {
            let want = want.simple_name().unwrap_or_default();
            if got.simple_name() != Some(want) {
                return Err(MatteError::ShapeMismatch(format!(
                    "param {index} of the handler should be a {want} but it is {got}"
                )));
            }
        }
        Ok(())
    }

    fn bind(&mut self, route: &Route, handler: &HandlerRef) -> Result<()> {
        let registration = format!(
            "\tmux.HandleFunc({}, {})",
            mux_pattern(route),
            handler.call_expr()
        );
        self.mux.claim(route, handler, registration)
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
        self.mux.render(Self::BOOTSTRAP, &[])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use http::Method;

    fn signature(types: Vec<TypeExpr>) -> Signature {
        Signature {
            params: types
                .into_iter()
                .enumerate()
                .map(|(i, ty)| ParamField {
                    names: vec![format!("p{i}")],
                    ty,
                })
                .collect(),
        }
    }

    fn http_type(name: &str) -> TypeExpr {
        TypeExpr::Qualified {
            package: "http".into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_matches_reference_shape() {
        let f = HttpFramework::new();
        f.matches(&reference_shape()).unwrap();
        f.matches(&signature(vec![
            http_type("ResponseWriter"),
            TypeExpr::Pointer(Box::new(http_type("Request"))),
        ]))
        .unwrap();
    }

    #[test]
    fn test_mismatch_names_position_and_type() {
        let f = HttpFramework::new();
        let err = f
            .matches(&signature(vec![
                http_type("ResponseWriter"),
                TypeExpr::Ident("string".into()),
            ]))
            .unwrap_err();
        assert!(matches!(err, MatteError::ShapeMismatch(m) if m.contains("param 1") && m.contains("Request")));
        let err = f
            .matches(&signature(vec![http_type("ResponseWriter")]))
            .unwrap_err();
        assert!(matches!(err, MatteError::ShapeMismatch(m) if m.contains("2 params")));
    }

    #[test]
    fn test_bind_and_finalize() {
        let mut f = HttpFramework::new();
        assert!(!f.is_active());
        let handler = HandlerRef {
            import_path: "example.com/app/router".into(),
            package_name: "router".into(),
            name: "Hello".into(),
            params: vec![],
        };
        f.bind(
            &Route {
                method: Method::GET,
                path: "/hello".into(),
            },
            &handler,
        )
        .unwrap();
        assert!(f.is_active());
        let bootstrap = f.finalize().unwrap();
        assert_eq!(bootstrap.function_name, "RunHttpServer");
        assert!(bootstrap
            .body
            .contains("mux.HandleFunc(\"GET /hello\", router.Hello)"));
    }
}
