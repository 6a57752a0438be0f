use std::fmt;

use http::Method;

use crate::syntax::TypeExpr;

/// Go's predeclared type names; every other identifier names a type of the
/// package that declares it.
pub const PREDECLARED_TYPES: [&str; 22] = [
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED_TYPES.contains(&name)
}

/// Where the generated verifier reads a parameter's raw value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamSource {
    /// Path value first, falling back to the query string
    #[default]
    Auto,
    Path,
    Query,
    Header,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Auto => write!(f, "auto"),
            ParamSource::Path => write!(f, "path"),
            ParamSource::Query => write!(f, "query"),
            ParamSource::Header => write!(f, "header"),
        }
    }
}

/// One handler parameter as seen by the verifier generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Parameter name, also the request key it is read from
    pub name: String,
    /// Declared type, including the pointer marker for optional parameters
    pub ty: TypeExpr,
    /// Required unless declared as a pointer
    pub required: bool,
    /// Request location
    pub source: ParamSource,
}

impl ParamDescriptor {
    /// Type the raw value is decoded into, without the optional marker.
    pub fn value_type(&self) -> &TypeExpr {
        match &self.ty {
            TypeExpr::Pointer(inner) => inner,
            other => other,
        }
    }

    /// The value type as spelled from outside `package_name`: predeclared
    /// types stay bare, package-local types get the package qualifier.
    pub fn go_type(&self, package_name: &str) -> String {
        match self.value_type() {
            TypeExpr::Ident(name) if !is_predeclared(name) => format!("{package_name}.{name}"),
            other => other.to_string(),
        }
    }

    /// Whether the raw request text is used as-is instead of being decoded.
    pub fn is_string(&self) -> bool {
        matches!(self.value_type(), TypeExpr::Ident(name) if name == "string")
    }
}

/// An HTTP method and path pair a handler is exposed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A handler function located in a project package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    /// Import path of the owning package
    pub import_path: String,
    /// Declared name of the owning package
    pub package_name: String,
    /// Function name
    pub name: String,
    /// Parameters in declaration order
    pub params: Vec<ParamDescriptor>,
}

impl HandlerRef {
    /// `import/path.Name`, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.import_path, self.name)
    }

    /// `pkg.Name`, the expression the generated program calls.
    pub fn call_expr(&self) -> String {
        format!("{}.{}", self.package_name, self.name)
    }
}

/// A route claimed by a handler inside one framework instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    pub route: Route,
    pub handler: HandlerRef,
}
