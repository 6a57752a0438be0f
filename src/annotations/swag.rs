//! Extended annotation grammar in the style of swag operation comments.
//!
//! ```text
//! // @Summary  Greet a caller
//! // @Tags     greetings
//! // @Param    name query string true "who to greet"
//! // @Success  200 {object} Greeting "ok"
//! // @Router   /hello [get]
//! ```
//!
//! Each comment line is fed to [`parse_comment_line`], which folds it into an
//! accumulating [`Operation`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{MatteError, Result};
use crate::handler::{parse_method, Route};

static ROUTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(/[\w./\-{}()+:$*@]*)\s+\[(\w+)\]$").expect("router regex should be valid")
});

static PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\S+)\s+(\w+)\s+(\S+)\s+(\w+)\s+"([^"]*)"(.*)$"#)
        .expect("param regex should be valid")
});

static RESPONSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\{(\w+)\}\s+(\S+)\s*(".*")?$"#).expect("response regex should be valid")
});

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\S+)\s+\{(\w+)\}\s+(\S+)\s*(".*")?$"#).expect("header regex should be valid")
});

static SECURITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w.\-]+)(?:\[([^\]]*)\])?$").expect("security regex should be valid")
});

/// Request locations accepted by `@Param`.
pub const PARAM_LOCATIONS: [&str; 5] = ["query", "path", "header", "body", "formData"];

/// A `@Param` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParam {
    pub name: String,
    /// One of [`PARAM_LOCATIONS`]
    pub location: String,
    pub data_type: String,
    pub required: bool,
    pub description: String,
}

/// A `@Success`, `@Failure` or `@Response` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResponse {
    /// `{object}`, `{array}`, `{string}`...
    pub kind: Option<String>,
    pub data_type: Option<String>,
    pub description: String,
    /// Headers declared with `@Header`
    pub headers: BTreeMap<String, ResponseHeader>,
}

/// A `@Header` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub kind: String,
    pub description: String,
}

/// Operation metadata accumulated from one doc comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub accept: Vec<String>,
    pub produce: Vec<String>,
    pub params: Vec<OperationParam>,
    /// Keyed by status code or `default`
    pub responses: BTreeMap<String, OperationResponse>,
    /// `@Router` entries in comment order
    pub routes: Vec<Route>,
    /// Alternatives of scheme-to-scopes requirements
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    pub deprecated: bool,
    pub code_samples: Option<Value>,
    /// `@x-*` vendor extensions
    pub extensions: BTreeMap<String, Value>,
    /// Any other `@attribute`
    pub metadata: BTreeMap<String, String>,
}

/// Fold one comment line into `operation`.
///
/// Returns whether the line carried a recognized annotation. Lines that do not
/// start with `@` are ignored, and unknown attributes land in
/// [`Operation::metadata`] without counting as recognized.
pub fn parse_comment_line(
    operation: &mut Operation,
    comment: &str,
    markdown_dir: Option<&Path>,
) -> Result<bool> {
    let line = comment.trim_start_matches('/').trim();
    if !line.starts_with('@') {
        return Ok(false);
    }
    let fields = fields_by_any_space(line, 2);
    let attribute = fields.first().copied().unwrap_or_default();
    let remainder = fields.get(1).copied().unwrap_or_default();
    let lower = attribute.to_lowercase();

    match lower.as_str() {
        "@description" => append_description(operation, remainder),
        "@description.markdown" => {
            let text = markdown_for_tag(remainder, markdown_dir)
                .map_err(|message| MatteError::annotation(line, message))?;
            append_description(operation, &text);
        }
        "@summary" => operation.summary = Some(remainder.to_string()),
        "@id" => operation.id = Some(remainder.to_string()),
        "@tags" => operation.tags.extend(split_list(remainder)),
        "@accept" => {
            let types = parse_mime_list(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.accept.extend(types);
        }
        "@produce" => {
            let types = parse_mime_list(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.produce.extend(types);
        }
        "@param" => {
            let param = parse_param(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.params.push(param);
        }
        "@success" | "@failure" | "@response" => {
            parse_response(operation, remainder).map_err(|m| MatteError::annotation(line, m))?;
        }
        "@header" => {
            parse_header(operation, remainder).map_err(|m| MatteError::annotation(line, m))?;
        }
        "@router" => {
            let route = parse_router(remainder, line)?;
            operation.routes.push(route);
        }
        "@security" => {
            let requirement =
                parse_security(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.security.extend(requirement);
        }
        "@deprecated" => operation.deprecated = true,
        "@x-codesamples" => {
            let value = json_value(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.code_samples = Some(value);
        }
        _ if lower.starts_with("@x-") => {
            let value = json_value(remainder).map_err(|m| MatteError::annotation(line, m))?;
            operation.extensions.insert(lower[1..].to_string(), value);
        }
        _ => {
            operation
                .metadata
                .insert(attribute[1..].to_string(), remainder.to_string());
            return Ok(false);
        }
    }
    Ok(true)
}

/// Split `s` on runs of whitespace into at most `n` fields; the last field
/// keeps the rest of the line, inner whitespace included.
pub fn fields_by_any_space(s: &str, n: usize) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if n > 0 && fields.len() + 1 >= n {
            fields.push(rest.trim_end());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}

fn append_description(operation: &mut Operation, text: &str) {
    if operation.description.is_empty() {
        operation.description = text.to_string();
    } else {
        operation.description.push('\n');
        operation.description.push_str(text);
    }
}

fn split_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn markdown_for_tag(tag: &str, dir: Option<&Path>) -> std::result::Result<String, String> {
    let dir = dir.ok_or_else(|| "no markdown directory is configured".to_string())?;
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("unable to read markdown directory {}: {e}", dir.display()))?;
    let mut names: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    names.sort();
    for path in names {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains(".md") && name.contains(tag) {
            return fs::read_to_string(&path)
                .map_err(|e| format!("failed to read markdown file {}: {e}", path.display()));
        }
    }
    Err(format!(
        "unable to find markdown file for tag {tag} in {}",
        dir.display()
    ))
}

fn mime_alias(alias: &str) -> Option<&'static str> {
    Some(match alias {
        "json" => "application/json",
        "xml" => "text/xml",
        "plain" => "text/plain",
        "html" => "text/html",
        "mpfd" => "multipart/form-data",
        "x-www-form-urlencoded" => "application/x-www-form-urlencoded",
        "json-api" => "application/vnd.api+json",
        "json-stream" => "application/x-json-stream",
        "octet-stream" => "application/octet-stream",
        "png" => "image/png",
        "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => return None,
    })
}

fn parse_mime_list(text: &str) -> std::result::Result<Vec<String>, String> {
    let mut out = Vec::new();
    for item in split_list(text) {
        if let Some(mime) = mime_alias(&item) {
            out.push(mime.to_string());
        } else if item.split('/').count() == 2 && !item.starts_with('/') && !item.ends_with('/') {
            out.push(item);
        } else {
            return Err(format!("{item} accept type can't be accepted"));
        }
    }
    Ok(out)
}

fn parse_param(text: &str) -> std::result::Result<OperationParam, String> {
    let caps = PARAM_RE
        .captures(text)
        .ok_or_else(|| "missing required param comment parameters".to_string())?;
    let location = caps[2].to_string();
    if !PARAM_LOCATIONS.contains(&location.as_str()) {
        return Err(format!("unknown param location '{location}'"));
    }
    let required = match caps[4].to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => return Err(format!("param required flag '{other}' must be true or false")),
    };
    Ok(OperationParam {
        name: caps[1].to_string(),
        location,
        data_type: caps[3].to_string(),
        required,
        description: caps[5].to_string(),
    })
}

fn status_codes(text: &str) -> std::result::Result<Vec<String>, String> {
    let codes: Vec<String> = split_list(text).collect();
    if codes.is_empty() {
        return Err("missing status code".to_string());
    }
    for code in &codes {
        if code != "default" && code.parse::<u16>().is_err() {
            return Err(format!("{code} is not a valid status code"));
        }
    }
    Ok(codes)
}

fn unquote_description(text: Option<&str>) -> String {
    text.map(|d| d.trim().trim_matches('"').to_string())
        .unwrap_or_default()
}

fn parse_response(operation: &mut Operation, text: &str) -> std::result::Result<(), String> {
    let fields = fields_by_any_space(text, 2);
    let codes = status_codes(fields.first().copied().unwrap_or_default())?;
    let rest = fields.get(1).copied().unwrap_or_default();

    let (kind, data_type, description) = if rest.starts_with('{') {
        let caps = RESPONSE_RE
            .captures(rest)
            .ok_or_else(|| format!("can not parse response comment \"{text}\""))?;
        (
            Some(caps[1].to_string()),
            Some(caps[2].to_string()),
            unquote_description(caps.get(3).map(|m| m.as_str())),
        )
    } else {
        (None, None, unquote_description(Some(rest)))
    };

    for code in codes {
        let response = operation.responses.entry(code).or_default();
        response.kind = kind.clone();
        response.data_type = data_type.clone();
        response.description = description.clone();
    }
    Ok(())
}

fn parse_header(operation: &mut Operation, text: &str) -> std::result::Result<(), String> {
    let caps = HEADER_RE
        .captures(text)
        .ok_or_else(|| format!("can not parse header comment \"{text}\""))?;
    let header = ResponseHeader {
        kind: caps[2].to_string(),
        description: unquote_description(caps.get(4).map(|m| m.as_str())),
    };
    let name = caps[3].to_string();
    let codes = &caps[1];
    if codes.eq_ignore_ascii_case("all") {
        for response in operation.responses.values_mut() {
            response.headers.insert(name.clone(), header.clone());
        }
        return Ok(());
    }
    for code in status_codes(codes)? {
        operation
            .responses
            .entry(code)
            .or_default()
            .headers
            .insert(name.clone(), header.clone());
    }
    Ok(())
}

fn parse_router(text: &str, line: &str) -> Result<Route> {
    let caps = ROUTER_RE.captures(text.trim()).ok_or_else(|| {
        MatteError::annotation(line, "can not parse router comment, expected '/path [method]'")
    })?;
    let method = parse_method(&caps[2])?;
    Ok(Route {
        method,
        path: caps[1].to_string(),
    })
}

fn parse_security(
    text: &str,
) -> std::result::Result<Vec<BTreeMap<String, Vec<String>>>, String> {
    let mut alternatives = Vec::new();
    for alternative in text.split("||") {
        let mut requirement = BTreeMap::new();
        for scheme in alternative.split("&&") {
            let scheme = scheme.trim();
            let caps = SECURITY_RE
                .captures(scheme)
                .ok_or_else(|| format!("invalid security scheme '{scheme}'"))?;
            let scopes = caps
                .get(2)
                .map(|m| split_list(m.as_str()).collect())
                .unwrap_or_default();
            requirement.insert(caps[1].to_string(), scopes);
        }
        alternatives.push(requirement);
    }
    Ok(alternatives)
}

fn json_value(text: &str) -> std::result::Result<Value, String> {
    if text.trim().is_empty() {
        return Err("annotation needs a value".to_string());
    }
    serde_json::from_str(text).map_err(|e| format!("annotation needs a valid json value: {e}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use http::Method;

    fn parse_all(lines: &[&str]) -> (Operation, Vec<bool>) {
        let mut op = Operation::default();
        let flags = lines
            .iter()
            .map(|l| parse_comment_line(&mut op, l, None).unwrap())
            .collect();
        (op, flags)
    }

    #[test]
    fn test_fields_by_any_space_keeps_remainder() {
        assert_eq!(
            fields_by_any_space("@Param  id   path int true \"x  y\"", 2),
            vec!["@Param", "id   path int true \"x  y\""]
        );
        assert_eq!(fields_by_any_space("  @Deprecated  ", 2), vec!["@Deprecated"]);
        assert!(fields_by_any_space("   ", 2).is_empty());
        assert_eq!(fields_by_any_space("a b c", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_router_lines() {
        let (op, flags) = parse_all(&["// @Router /hello [get]", "@router /items/{id} [DELETE]"]);
        assert_eq!(flags, vec![true, true]);
        assert_eq!(op.routes[0].method, Method::GET);
        assert_eq!(op.routes[0].path, "/hello");
        assert_eq!(op.routes[1].method, Method::DELETE);
        assert_eq!(op.routes[1].path, "/items/{id}");
    }

    #[test]
    fn test_router_with_bad_method() {
        let mut op = Operation::default();
        let err = parse_comment_line(&mut op, "@Router /hello [fetch]", None).unwrap_err();
        assert!(matches!(err, MatteError::InvalidMethod(_)));
        let err = parse_comment_line(&mut op, "@Router hello", None).unwrap_err();
        assert!(matches!(err, MatteError::Annotation { .. }));
    }

    #[test]
    fn test_param_line() {
        let (op, _) = parse_all(&[r#"@Param name query string true "who to greet" default(x)"#]);
        let param = &op.params[0];
        assert_eq!(param.name, "name");
        assert_eq!(param.location, "query");
        assert_eq!(param.data_type, "string");
        assert!(param.required);
        assert_eq!(param.description, "who to greet");
    }

    #[test]
    fn test_param_line_errors() {
        let mut op = Operation::default();
        assert!(parse_comment_line(&mut op, r#"@Param id cookie int true "x""#, None).is_err());
        assert!(parse_comment_line(&mut op, r#"@Param id path int maybe "x""#, None).is_err());
        assert!(parse_comment_line(&mut op, "@Param id", None).is_err());
    }

    #[test]
    fn test_responses_and_headers() {
        let (op, _) = parse_all(&[
            r#"@Success 200,201 {object} Greeting "ok""#,
            r#"@Failure 400 "bad input""#,
            r#"@Header 200 {string} X-Request-Id "trace id""#,
            r#"@Header all {int} X-Rate "remaining""#,
        ]);
        let ok = &op.responses["200"];
        assert_eq!(ok.kind.as_deref(), Some("object"));
        assert_eq!(ok.data_type.as_deref(), Some("Greeting"));
        assert_eq!(ok.description, "ok");
        assert!(ok.headers.contains_key("X-Request-Id"));
        assert!(op.responses["201"].headers.contains_key("X-Rate"));
        assert_eq!(op.responses["400"].description, "bad input");
        assert!(op.responses["400"].headers.contains_key("X-Rate"));
    }

    #[test]
    fn test_response_with_bad_code() {
        let mut op = Operation::default();
        assert!(parse_comment_line(&mut op, r#"@Success ok "fine""#, None).is_err());
    }

    #[test]
    fn test_documentation_attributes() {
        let (op, flags) = parse_all(&[
            "@Summary Greet a caller",
            "@Description first",
            "@Description second",
            "@ID greet",
            "@Tags a, b",
            "@Accept json,mpfd",
            "@Produce text/csv",
            "@Deprecated",
        ]);
        assert!(flags.iter().all(|f| *f));
        assert_eq!(op.summary.as_deref(), Some("Greet a caller"));
        assert_eq!(op.description, "first\nsecond");
        assert_eq!(op.id.as_deref(), Some("greet"));
        assert_eq!(op.tags, vec!["a", "b"]);
        assert_eq!(op.accept, vec!["application/json", "multipart/form-data"]);
        assert_eq!(op.produce, vec!["text/csv"]);
        assert!(op.deprecated);
    }

    #[test]
    fn test_unknown_mime_type() {
        let mut op = Operation::default();
        assert!(parse_comment_line(&mut op, "@Accept yaml", None).is_err());
    }

    #[test]
    fn test_security_alternatives() {
        let (op, _) = parse_all(&["@Security OAuth2[read, write] || ApiKey && Basic"]);
        assert_eq!(op.security.len(), 2);
        assert_eq!(op.security[0]["OAuth2"], vec!["read", "write"]);
        assert!(op.security[1].contains_key("ApiKey"));
        assert!(op.security[1]["Basic"].is_empty());
    }

    #[test]
    fn test_extensions_need_json() {
        let (op, _) = parse_all(&[r#"@x-internal {"team": "core"}"#, r#"@x-codeSamples [{"lang": "go"}]"#]);
        assert_eq!(op.extensions["x-internal"]["team"], "core");
        assert!(op.code_samples.is_some());

        let mut op = Operation::default();
        assert!(parse_comment_line(&mut op, "@x-internal not json", None).is_err());
        assert!(parse_comment_line(&mut op, "@x-internal", None).is_err());
    }

    #[test]
    fn test_unknown_attributes_are_metadata() {
        let (op, flags) = parse_all(&["@Owner platform-team", "plain text", ""]);
        assert_eq!(flags, vec![false, false, false]);
        assert_eq!(op.metadata["Owner"], "platform-team");
    }

    #[test]
    fn test_description_markdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greetings.md"), "# Greetings").unwrap();
        let mut op = Operation::default();
        assert!(parse_comment_line(&mut op, "@Description.markdown greetings", Some(dir.path())).unwrap());
        assert_eq!(op.description, "# Greetings");
        assert!(parse_comment_line(&mut op, "@Description.markdown missing", Some(dir.path())).is_err());
        assert!(parse_comment_line(&mut op, "@Description.markdown greetings", None).is_err());
    }
}
