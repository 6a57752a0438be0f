//! Framework configuration read from the project's general API info function.
//!
//! ```go
//! func GeneralAPIInfo() (frameworks.HttpConfig, frameworks.ParamsConfig) {
//!     return frameworks.HttpConfig{Addr: ":8080"}, frameworks.ParamsConfig{Addr: ":8081"}
//! }
//! ```
//!
//! Each returned composite literal configures the first framework, in
//! configuration order, that is not configured yet and accepts its shape.

use tracing::{debug, info};

use crate::error::{MatteError, Result};
use crate::project::Project;
use crate::syntax::{Expr, TypeExpr};

use super::Frameworks;

/// Name of the function every project declares in its root package.
pub const GENERAL_API_INFO: &str = "GeneralAPIInfo";

/// One `Key: literal` element of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigField {
    pub key: String,
    /// Literal exactly as written in the source
    pub literal: String,
}

/// A composite literal returned by the general API info function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    /// Package qualifier of the literal's type, if any
    pub package: Option<String>,
    /// Simple type name, e.g. `HttpConfig`
    pub type_name: String,
    pub fields: Vec<ConfigField>,
}

/// Read the configuration values returned by the root package's
/// [`GENERAL_API_INFO`] function.
///
/// # Errors
///
/// `Configuration` when the function is missing, declared more than once, or
/// returns anything other than `T{Key: literal}` values.
pub fn extract_general_api_info(project: &Project) -> Result<Vec<ConfigValue>> {
    let root = project.root_package().ok_or_else(|| {
        MatteError::Configuration(format!("{} has no root package", project.root.display()))
    })?;
    let candidates: Vec<_> = root
        .functions()
        .filter(|(_, func)| !func.has_receiver && func.name == GENERAL_API_INFO)
        .collect();
    let (file, func) = match candidates.as_slice() {
        [single] => *single,
        [] => {
            return Err(MatteError::Configuration(format!(
                "the root package of {} must declare a {GENERAL_API_INFO} function",
                project.root.display()
            )))
        }
        many => {
            return Err(MatteError::Configuration(format!(
                "the root package of {} declares {GENERAL_API_INFO} {} times",
                project.root.display(),
                many.len()
            )))
        }
    };

    let Some(results) = func.returns.first() else {
        debug!(file = %file.path.display(), "{GENERAL_API_INFO} returns nothing");
        return Ok(Vec::new());
    };
    results
        .iter()
        .enumerate()
        .map(|(index, expr)| {
            config_value(expr).map_err(|message| {
                MatteError::Configuration(format!(
                    "{}:{}: result {index} of {GENERAL_API_INFO} {message}",
                    file.path.display(),
                    func.line
                ))
            })
        })
        .collect()
}

fn config_value(expr: &Expr) -> std::result::Result<ConfigValue, String> {
    let Expr::CompositeLit(lit) = expr else {
        return Err("must be a composite literal".to_string());
    };
    let (package, type_name) = match &lit.ty {
        TypeExpr::Ident(name) => (None, name.clone()),
        TypeExpr::Qualified { package, name } => (Some(package.clone()), name.clone()),
        other => return Err(format!("has unsupported type {other}")),
    };
    let fields = lit
        .elements
        .iter()
        .map(|element| {
            let key = element
                .key
                .as_deref()
                .filter(|k| is_identifier(k))
                .ok_or_else(|| format!("{type_name} elements must be keyed by field name"))?;
            match &element.value {
                Expr::BasicLit(literal) => Ok(ConfigField {
                    key: key.to_string(),
                    literal: literal.clone(),
                }),
                _ => Err(format!("{type_name}.{key} must be a literal value")),
            }
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;
    Ok(ConfigValue {
        package,
        type_name,
        fields,
    })
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Hand every value to the first unconfigured framework that accepts it.
///
/// # Errors
///
/// `TypeMismatch` when no framework accepts a value.
pub fn configure_frameworks(frameworks: &mut Frameworks, values: &[ConfigValue]) -> Result<()> {
    for value in values {
        let mut reasons = Vec::new();
        let mut accepted = None;
        for framework in frameworks.iter_mut() {
            if framework.is_configured() {
                continue;
            }
            match framework.configure(value) {
                Ok(()) => {
                    accepted = Some(framework.kind().to_string());
                    break;
                }
                Err(MatteError::TypeMismatch(reason)) => {
                    reasons.push(format!("{}: {reason}", framework.kind()));
                }
                Err(other) => return Err(other),
            }
        }
        match accepted {
            Some(kind) => info!(framework = %kind, value = %value.type_name, "framework configured"),
            None => {
                return Err(MatteError::TypeMismatch(format!(
                    "no framework accepts a {} value ({})",
                    value.type_name,
                    if reasons.is_empty() {
                        "every framework is already configured".to_string()
                    } else {
                        reasons.join("; ")
                    }
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::syntax::parse_source;
    use std::path::Path;

    fn value(type_name: &str, addr: &str) -> ConfigValue {
        ConfigValue {
            package: Some("frameworks".into()),
            type_name: type_name.into(),
            fields: vec![ConfigField {
                key: "Addr".into(),
                literal: format!("\"{addr}\""),
            }],
        }
    }

    fn project_with(source: &str) -> Project {
        let file = parse_source(Path::new("/app/main.go"), source.as_bytes()).unwrap();
        Project {
            root: "/app".into(),
            module_path: "example.com/app".into(),
            packages: vec![crate::project::Package {
                import_path: "example.com/app".into(),
                name: file.package_name.clone(),
                dir: "/app".into(),
                files: vec![file],
            }],
        }
    }

    #[test]
    fn test_extracts_composite_literals() {
        let project = project_with(
            r#"package main

import "example.com/app/frameworks"

func GeneralAPIInfo() (frameworks.HttpConfig, ParamsConfig) {
	return frameworks.HttpConfig{Addr: ":9000"}, ParamsConfig{
		Addr: `:9001`,
	}
}
"#,
        );
        let values = extract_general_api_info(&project).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].package.as_deref(), Some("frameworks"));
        assert_eq!(values[0].type_name, "HttpConfig");
        assert_eq!(values[0].fields[0].literal, "\":9000\"");
        assert_eq!(values[1].package, None);
        assert_eq!(values[1].fields[0].literal, "`:9001`");
    }

    #[test]
    fn test_missing_function_is_configuration_error() {
        let project = project_with("package main\n\nfunc main() {}\n");
        assert!(matches!(
            extract_general_api_info(&project).unwrap_err(),
            MatteError::Configuration(m) if m.contains(GENERAL_API_INFO)
        ));
    }

    #[test]
    fn test_non_literal_results_are_rejected() {
        let project = project_with(
            "package main\n\nfunc GeneralAPIInfo() HttpConfig {\n\treturn makeConfig()\n}\n",
        );
        assert!(matches!(
            extract_general_api_info(&project).unwrap_err(),
            MatteError::Configuration(_)
        ));
        let project = project_with(
            "package main\n\nfunc GeneralAPIInfo() HttpConfig {\n\treturn HttpConfig{Addr: addr}\n}\n",
        );
        assert!(extract_general_api_info(&project).is_err());
    }

    #[test]
    fn test_no_return_means_no_values() {
        let project = project_with("package main\n\nfunc GeneralAPIInfo() {}\n");
        assert!(extract_general_api_info(&project).unwrap().is_empty());
    }

    #[test]
    fn test_values_go_to_first_accepting_framework() {
        let mut frameworks = Frameworks::default_set();
        configure_frameworks(
            &mut frameworks,
            &[value("ParamsConfig", ":9001"), value("HttpConfig", ":9000")],
        )
        .unwrap();
        assert!(frameworks.iter().all(|f| f.is_configured()));
    }

    #[test]
    fn test_unaccepted_value_is_type_mismatch() {
        let mut frameworks = Frameworks::default_set();
        let err = configure_frameworks(&mut frameworks, &[value("GinConfig", ":1")]).unwrap_err();
        assert!(matches!(err, MatteError::TypeMismatch(m) if m.contains("GinConfig")));

        let mut frameworks = Frameworks::default_set();
        let err = configure_frameworks(
            &mut frameworks,
            &[value("HttpConfig", ":1"), value("HttpConfig", ":2")],
        )
        .unwrap_err();
        assert!(matches!(err, MatteError::TypeMismatch(_)));
    }
}
