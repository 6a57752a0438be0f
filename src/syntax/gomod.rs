use super::literal::unquote;

/// Extract the module path declared by a `go.mod` file.
///
/// Handles trailing `//` comments, quoted paths and the parenthesized
/// `module ( path )` form. Returns `None` when no module directive is present.
pub fn parse_module_path(contents: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(contents);
    let mut in_block = false;
    for raw in text.lines() {
        let line = match raw.find("//") {
            Some(idx) => &raw[..idx],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }
        if in_block {
            if line == ")" {
                in_block = false;
                continue;
            }
            return module_value(line);
        }
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        let rest = rest.trim_start();
        if rest.len() == line.len() - "module".len() && !rest.starts_with('(') {
            // `modulefoo` is not a module directive.
            continue;
        }
        if rest == "(" {
            in_block = true;
            continue;
        }
        return module_value(rest);
    }
    None
}

/// Extract the language version of a `go.mod` file's `go` directive as
/// `(major, minor)`. `go 1.22`, `go 1.22.3` and `go 1.23rc1` are understood.
pub fn parse_go_version(contents: &[u8]) -> Option<(u32, u32)> {
    let text = String::from_utf8_lossy(contents);
    text.lines().find_map(|raw| {
        let line = raw.split("//").next().unwrap_or_default().trim();
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("go") {
            return None;
        }
        let (major, rest) = tokens.next()?.split_once('.')?;
        let minor: String = rest.chars().take_while(char::is_ascii_digit).collect();
        Some((major.parse().ok()?, minor.parse().ok()?))
    })
}

fn module_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let value = if raw.starts_with('"') || raw.starts_with('`') {
        unquote(raw)?
    } else {
        raw.split_whitespace().next()?.to_string()
    };
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_module() {
        let gomod = b"module github.com/ondbyte/test_project\n\ngo 1.22\n";
        assert_eq!(
            parse_module_path(gomod).as_deref(),
            Some("github.com/ondbyte/test_project")
        );
    }

    #[test]
    fn test_module_with_comment_and_quotes() {
        let gomod = b"// leading comment\nmodule \"example.com/app\" // trailing\n";
        assert_eq!(parse_module_path(gomod).as_deref(), Some("example.com/app"));
    }

    #[test]
    fn test_module_block() {
        let gomod = b"module (\n    example.com/blocky\n)\n";
        assert_eq!(parse_module_path(gomod).as_deref(), Some("example.com/blocky"));
    }

    #[test]
    fn test_go_directive() {
        assert_eq!(parse_go_version(b"module a\n\ngo 1.22\n"), Some((1, 22)));
        assert_eq!(parse_go_version(b"module a\ngo 1.21.5 // pinned\n"), Some((1, 21)));
        assert_eq!(parse_go_version(b"module a\ngo 1.23rc1\n"), Some((1, 23)));
        assert_eq!(parse_go_version(b"module a\ntoolchain go1.22.0\n"), None);
        assert_eq!(parse_go_version(b"module a\n"), None);
    }

    #[test]
    fn test_missing_module() {
        assert_eq!(parse_module_path(b"go 1.22\nrequire x v1.0.0\n"), None);
        assert_eq!(parse_module_path(b"modulex foo\n"), None);
        assert_eq!(parse_module_path(b""), None);
    }
}
