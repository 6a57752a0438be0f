use crate::error::{MatteError, Result};
use crate::syntax::literal::{unquote, unquote_rune};

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO]?[0-7_]+|[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?)$",
    )
    .expect("number literal regex should be valid")
});

/// Decorators understood by the pipeline.
pub const KNOWN_DECORATORS: [&str; 1] = ["path"];

/// One `@name(arg, ...)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub name: String,
    /// Argument values; string and rune literals are decoded, other literals kept as written
    pub args: Vec<String>,
}

/// Whether a comment line uses the decorator grammar: its first token starts
/// with `@` and contains `(`.
pub fn is_decorator_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.starts_with('@') && token.contains('('))
}

/// Parse every decorator on a comment line.
///
/// A line that does not start with `@` yields nothing. Text between two
/// decorators must be blank.
pub fn parse_decorator_line(line: &str) -> Result<Vec<Decorator>> {
    let mut cursor = Cursor::new(line);
    let mut decorators = Vec::new();
    cursor.skip_ws();
    if !cursor.peek_is('@') {
        return Ok(decorators);
    }
    while !cursor.at_end() {
        if !cursor.eat('@') {
            return Err(MatteError::DecoratorSyntax(format!(
                "unexpected text '{}' between decorators",
                cursor.rest().trim()
            )));
        }
        decorators.push(parse_call(&mut cursor, line)?);
        cursor.skip_ws();
    }
    Ok(decorators)
}

/// Parse a single decorator written without its leading `@`: `path("GET", "/x")`.
pub fn parse_decorator(text: &str) -> Result<Decorator> {
    let mut cursor = Cursor::new(text);
    let decorator = parse_call(&mut cursor, text)?;
    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(MatteError::DecoratorSyntax(format!(
            "unexpected trailing text '{}' in '{text}'",
            cursor.rest()
        )));
    }
    Ok(decorator)
}

fn parse_call(cursor: &mut Cursor<'_>, source: &str) -> Result<Decorator> {
    let name = cursor.take_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(MatteError::DecoratorSyntax(format!(
            "expected a decorator name in '{}'",
            source.trim()
        )));
    }
    if name.contains('.') || !KNOWN_DECORATORS.contains(&name) {
        return Err(MatteError::DecoratorSyntax(format!(
            "'{name}' doesn't match any available decorator"
        )));
    }
    cursor.skip_ws();
    if !cursor.eat('(') {
        return Err(MatteError::DecoratorSyntax(format!(
            "decorator '{name}' must be written as a call: {name}(...)"
        )));
    }

    let mut args = Vec::new();
    cursor.skip_ws();
    if cursor.eat(')') {
        return Ok(Decorator {
            name: name.to_string(),
            args,
        });
    }
    loop {
        cursor.skip_ws();
        let raw = cursor.take_argument().ok_or_else(|| {
            MatteError::DecoratorSyntax(format!("unterminated literal in '{}'", source.trim()))
        })?;
        args.push(literal_value(raw.trim()).ok_or_else(|| {
            MatteError::DecoratorSyntax(format!(
                "argument '{}' of decorator '{name}' is not a literal",
                raw.trim()
            ))
        })?);
        cursor.skip_ws();
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat(')') {
            break;
        }
        return Err(MatteError::DecoratorSyntax(format!(
            "missing ')' after arguments of decorator '{name}'"
        )));
    }
    Ok(Decorator {
        name: name.to_string(),
        args,
    })
}

fn literal_value(raw: &str) -> Option<String> {
    if raw.starts_with('"') || raw.starts_with('`') {
        return unquote(raw);
    }
    if raw.starts_with('\'') {
        return unquote_rune(raw);
    }
    if raw == "true" || raw == "false" || NUMBER_LITERAL.is_match(raw) {
        return Some(raw.to_string());
    }
    None
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek_is(&self, c: char) -> bool {
        self.rest().starts_with(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek_is(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Consume one argument up to the next top-level `,` or `)`, honouring quotes.
    fn take_argument(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            match quote {
                Some(q) => {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' && q != '`' {
                        escaped = true;
                    } else if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    '"' | '\'' | '`' => quote = Some(c),
                    ',' | ')' => {
                        self.pos += i;
                        return Some(&rest[..i]);
                    }
                    _ => {}
                },
            }
        }
        None
    }
}
