use std::fmt;
use std::path::PathBuf;

/// A Go type expression, reduced to what handler matching needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `string`, `uint`, `MyStruct`
    Ident(String),
    /// `http.Request`
    Qualified {
        /// Package qualifier
        package: String,
        /// Type name
        name: String,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// Anything else (slices, maps, funcs, generics), kept as source text
    Other(String),
}

impl TypeExpr {
    /// Whether the outermost layer is a pointer.
    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeExpr::Pointer(_))
    }

    /// Simple name of the type after unwrapping at most one pointer layer.
    ///
    /// `*http.Request` → `Request`, `uint` → `uint`, `**T` → `None`.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Pointer(inner) => inner.direct_name(),
            other => other.direct_name(),
        }
    }

    fn direct_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) => Some(name),
            TypeExpr::Qualified { name, .. } => Some(name),
            TypeExpr::Pointer(_) | TypeExpr::Other(_) => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident(name) => write!(f, "{name}"),
            TypeExpr::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Other(text) => write!(f, "{text}"),
        }
    }
}

/// One field of a parameter list: `a, b int` has two names and one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamField {
    /// Declared names; empty for unnamed parameters
    pub names: Vec<String>,
    /// Declared type
    pub ty: TypeExpr,
}

/// Parameter list of a function declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// Fields in declaration order
    pub params: Vec<ParamField>,
}

impl Signature {
    /// Number of parameter positions, counting every name of a grouped field.
    pub fn arity(&self) -> usize {
        self.params.iter().map(|f| f.names.len().max(1)).sum()
    }

    /// Every parameter position as `(name, type)`, in declaration order.
    pub fn positions(&self) -> Vec<(Option<&str>, &TypeExpr)> {
        let mut out = Vec::with_capacity(self.arity());
        for field in &self.params {
            if field.names.is_empty() {
                out.push((None, &field.ty));
            } else {
                for name in &field.names {
                    out.push((Some(name.as_str()), &field.ty));
                }
            }
        }
        out
    }
}

/// Documentation comment attached to a declaration, one entry per source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    /// Comment text with the `//` or `/* */` markers removed
    pub lines: Vec<String>,
}

/// `import name "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit import name (`_`, `.`, or an alias)
    pub name: Option<String>,
    /// Unquoted import path
    pub path: String,
}

/// Expressions found in `return` statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `T{Key: value}`
    CompositeLit(CompositeLit),
    /// A literal exactly as written: `"x"`, `42`, `true`
    BasicLit(String),
    /// Any other expression, as source text
    Other(String),
}

/// A composite literal such as `frameworks.HttpConfig{Addr: ":8080"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLit {
    /// Literal type
    pub ty: TypeExpr,
    /// Elements in source order
    pub elements: Vec<Element>,
}

/// One element of a composite literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Key text for keyed elements
    pub key: Option<String>,
    /// Element value
    pub value: Expr,
}

/// A top-level function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Function name
    pub name: String,
    /// Methods have a receiver and are never handlers
    pub has_receiver: bool,
    /// Attached documentation comment
    pub doc: Option<CommentGroup>,
    /// Parameter list
    pub signature: Signature,
    /// Results of each `return` statement directly inside the body
    pub returns: Vec<Vec<Expr>>,
    /// 1-based line of the `func` keyword
    pub line: usize,
}

/// A parsed `.go` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    /// Where the file was read from
    pub path: PathBuf,
    /// Name from the `package` clause
    pub package_name: String,
    /// Import specs in source order
    pub imports: Vec<ImportSpec>,
    /// Function and method declarations in source order
    pub functions: Vec<FuncDecl>,
}
