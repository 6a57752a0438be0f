//! Parameter verification code for handlers that take typed request values.
//!
//! Each parameter is read, checked and decoded in declaration order. As soon
//! as one parameter produced a diagnostic the request is answered with
//! `418 I'm a teapot` and later parameters are never looked at.

use crate::error::Result;
use crate::handler::{HandlerRef, ParamDescriptor, ParamSource, Route};
use crate::syntax::literal::quote;

use super::templates::{render_fragment, ParamsHandlerTemplate, VerifiedParam};

/// `"METHOD /path"` as a Go string literal, the pattern `http.ServeMux` routes on.
pub fn mux_pattern(route: &Route) -> String {
    quote(&format!("{} {}", route.method, route.path))
}

/// Template view of one parameter of a handler declared in `package_name`.
pub fn verified_param(param: &ParamDescriptor, package_name: &str) -> VerifiedParam {
    let key = quote(&param.name);
    let lookup = match param.source {
        ParamSource::Auto | ParamSource::Path => format!("r.PathValue({key})"),
        ParamSource::Query => format!("r.URL.Query().Get({key})"),
        ParamSource::Header => format!("r.Header.Get({key})"),
    };
    VerifiedParam {
        name: param.name.clone(),
        fallback_to_query: param.source == ParamSource::Auto,
        key,
        lookup,
        raw_var: format!("{}Raw", param.name),
        value_var: format!("{}Val", param.name),
        go_type: param.go_type(package_name),
        required: param.required,
        is_string: param.is_string(),
    }
}

/// Handler call arguments: required values are dereferenced, optional ones
/// are passed as pointers.
pub fn call_args(params: &[ParamDescriptor]) -> String {
    params
        .iter()
        .map(|p| {
            if p.required {
                format!("*{}Val", p.name)
            } else {
                format!("{}Val", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether the verifier for `params` needs `encoding/json`.
pub fn needs_json(params: &[ParamDescriptor]) -> bool {
    params.iter().any(|p| !p.is_string())
}

/// Render the `mux.HandleFunc` statement wrapping `handler` in verification code.
pub fn render_verifying_registration(route: &Route, handler: &HandlerRef) -> Result<String> {
    render_fragment(&ParamsHandlerTemplate {
        pattern: mux_pattern(route),
        params: handler
            .params
            .iter()
            .map(|p| verified_param(p, &handler.package_name))
            .collect(),
        call: handler.call_expr(),
        args: call_args(&handler.params),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::syntax::TypeExpr;
    use http::Method;

    fn param(name: &str, ty: TypeExpr, source: ParamSource) -> ParamDescriptor {
        ParamDescriptor {
            name: name.into(),
            required: !ty.is_pointer(),
            ty,
            source,
        }
    }

    fn ident(name: &str) -> TypeExpr {
        TypeExpr::Ident(name.into())
    }

    fn ptr(name: &str) -> TypeExpr {
        TypeExpr::Pointer(Box::new(ident(name)))
    }

    fn handler(params: Vec<ParamDescriptor>) -> HandlerRef {
        HandlerRef {
            import_path: "example.com/app/yadu".into(),
            package_name: "yadu".into(),
            name: "Handle".into(),
            params,
        }
    }

    #[test]
    fn test_lookup_by_source() {
        let auto = verified_param(&param("id", ident("int"), ParamSource::Auto), "api");
        assert_eq!(auto.lookup, r#"r.PathValue("id")"#);
        assert!(auto.fallback_to_query);
        let query = verified_param(&param("q", ident("string"), ParamSource::Query), "api");
        assert_eq!(query.lookup, r#"r.URL.Query().Get("q")"#);
        assert!(!query.fallback_to_query);
        let header = verified_param(&param("token", ident("string"), ParamSource::Header), "api");
        assert_eq!(header.lookup, r#"r.Header.Get("token")"#);
    }

    #[test]
    fn test_call_args_dereference_required_only() {
        let params = vec![
            param("yadu", ptr("string"), ParamSource::Auto),
            param("chinmaya", ident("uint"), ParamSource::Auto),
            param("yadu2", ptr("int"), ParamSource::Auto),
        ];
        assert_eq!(call_args(&params), "yaduVal, *chinmayaVal, yadu2Val");
        assert!(needs_json(&params));
        assert!(!needs_json(&params[..1]));
    }

    #[test]
    fn test_verifier_checks_each_param_before_the_next() {
        let h = handler(vec![
            param("yadu", ptr("string"), ParamSource::Auto),
            param("chinmaya", ident("uint"), ParamSource::Auto),
            param("yadu2", ptr("int"), ParamSource::Auto),
        ]);
        let route = Route {
            method: Method::GET,
            path: "/hello".into(),
        };
        let src = render_verifying_registration(&route, &h).unwrap();

        assert!(src.starts_with("\tmux.HandleFunc(\"GET /hello\", func(w http.ResponseWriter, r *http.Request) {"));
        assert!(src.contains("param 'chinmaya' is required\\n"));
        assert!(!src.contains("param 'yadu' is required"));
        assert!(!src.contains("param 'yadu2' is required"));
        assert!(src.contains("*yaduVal = yaduRaw"));
        assert!(src.contains("json.Unmarshal([]byte(chinmayaRaw), chinmayaVal)"));
        assert!(src.contains("cannot be decoded into type uint"));
        assert!(src.contains("http.StatusTeapot"));

        let check_chinmaya = src.find("param 'chinmaya' is required").unwrap();
        let first_teapot_after = src[check_chinmaya..].find("http.StatusTeapot").unwrap() + check_chinmaya;
        let read_yadu2 = src.find("yadu2Raw := ").unwrap();
        assert!(first_teapot_after < read_yadu2);
        assert_eq!(src.matches("http.StatusTeapot").count(), 3);
        assert!(src.trim_end().ends_with("yadu.Handle(yaduVal, *chinmayaVal, yadu2Val)\n\t})"));
    }

    #[test]
    fn test_package_local_types_are_qualified() {
        let h = handler(vec![
            param("c", ident("Color"), ParamSource::Auto),
            param("shade", ptr("Shade"), ParamSource::Query),
        ]);
        let route = Route {
            method: Method::GET,
            path: "/c".into(),
        };
        let src = render_verifying_registration(&route, &h).unwrap();
        assert!(src.contains("cVal := new(yadu.Color)"));
        assert!(src.contains("shadeVal := new(yadu.Shade)"));
        assert!(src.contains("cannot be decoded into type yadu.Color"));
        assert!(!src.contains("new(Color)"));
    }
}
