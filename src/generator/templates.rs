use askama::Template;

/// One parameter of a verifying handler, pre-computed for the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedParam {
    /// Parameter name as declared by the handler
    pub name: String,
    /// Go string literal of the request key
    pub key: String,
    /// Go expression reading the raw value from the request
    pub lookup: String,
    /// Retry the query string when the path value is empty
    pub fallback_to_query: bool,
    /// Local holding the raw text
    pub raw_var: String,
    /// Local holding the decoded pointer
    pub value_var: String,
    /// Go type decoded into
    pub go_type: String,
    pub required: bool,
    /// Raw text is used verbatim instead of being JSON-decoded
    pub is_string: bool,
}

/// Template data for one framework's bootstrap function
#[derive(Template)]
#[template(path = "bootstrap.go.txt", escape = "none")]
pub struct BootstrapTemplate {
    /// Bootstrap function name
    pub function_name: String,
    /// Go string literal of the listen address
    pub addr: String,
    /// Registration statements, each already indented one level
    pub registrations: Vec<String>,
}

/// Template data for a registration that verifies parameters before calling the handler
#[derive(Template)]
#[template(path = "params_handler.go.txt", escape = "none")]
pub struct ParamsHandlerTemplate {
    /// Go string literal of the `METHOD /path` pattern
    pub pattern: String,
    /// Parameters in declaration order
    pub params: Vec<VerifiedParam>,
    /// `pkg.Handler`
    pub call: String,
    /// Call arguments, comma separated
    pub args: String,
}

/// Template data for the synthesized program
#[derive(Template)]
#[template(path = "program.go.txt", escape = "none")]
pub struct ProgramTemplate {
    /// Quoted standard library import specs
    pub std_imports: Vec<String>,
    /// Quoted project import specs
    pub project_imports: Vec<String>,
    /// Bootstrap functions in framework order
    pub bootstrap_names: Vec<String>,
    /// Bootstrap function sources in framework order
    pub bootstrap_bodies: Vec<String>,
}

/// Render a template and drop the trailing newline so fragments compose cleanly.
pub fn render_fragment<T: Template>(template: &T) -> crate::error::Result<String> {
    let rendered = template.render()?;
    Ok(rendered.trim_end_matches('\n').to_string())
}
