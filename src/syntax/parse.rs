use std::fs;
use std::path::Path;

use tree_sitter::{Node, Parser};

use super::literal::unquote;
use super::types::{
    CommentGroup, CompositeLit, Element, Expr, FuncDecl, GoFile, ImportSpec, ParamField,
    Signature, TypeExpr,
};
use crate::error::{MatteError, Result};

/// Read and parse one Go source file.
pub fn parse_file(path: &Path) -> Result<GoFile> {
    let source = fs::read(path).map_err(|e| MatteError::io_at("read", path, e))?;
    parse_source(path, &source)
}

/// Parse Go source text. `path` is only used for diagnostics.
///
/// Any syntax error in the file fails the whole parse and reports the first
/// offending position.
pub fn parse_source(path: &Path, source: &[u8]) -> Result<GoFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::language())
        .map_err(|e| MatteError::Configuration(format!("unable to load the Go grammar: {e}")))?;
    let tree = parser.parse(source, None).ok_or_else(|| MatteError::Parse {
        file: path.to_path_buf(),
        line: 1,
        column: 1,
        message: "parser produced no syntax tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column, message) = first_error(root, source);
        return Err(MatteError::Parse {
            file: path.to_path_buf(),
            line,
            column,
            message,
        });
    }

    let mut file = GoFile {
        path: path.to_path_buf(),
        package_name: String::new(),
        imports: Vec::new(),
        functions: Vec::new(),
    };

    let mut cursor = root.walk();
    let children: Vec<Node> = root.children(&mut cursor).collect();
    for (idx, child) in children.iter().enumerate() {
        match child.kind() {
            "package_clause" => {
                file.package_name = first_named_of_kind(*child, "package_identifier")
                    .map(|n| text(n, source).to_string())
                    .unwrap_or_default();
            }
            "import_declaration" => collect_imports(*child, source, &mut file.imports),
            "function_declaration" | "method_declaration" => {
                let doc = doc_comment(&children[..idx], *child, source);
                file.functions.push(function(*child, doc, source));
            }
            _ => {}
        }
    }

    if file.package_name.is_empty() {
        return Err(MatteError::Parse {
            file: path.to_path_buf(),
            line: 1,
            column: 1,
            message: "missing package clause".to_string(),
        });
    }
    Ok(file)
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn first_named_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn first_error(root: Node, source: &[u8]) -> (usize, usize, String) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column + 1, format!("missing {}", node.kind()));
        }
        if node.is_error() {
            let pos = node.start_position();
            let snippet: String = text(node, source)
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(32)
                .collect();
            return (pos.row + 1, pos.column + 1, format!("unexpected `{snippet}`"));
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        // Depth-first in source order.
        for child in children.into_iter().rev() {
            if child.has_error() || child.is_missing() {
                stack.push(child);
            }
        }
    }
    let pos = root.start_position();
    (pos.row + 1, pos.column + 1, "syntax error".to_string())
}

fn collect_imports(node: Node, source: &[u8], imports: &mut Vec<ImportSpec>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => imports.extend(import_spec(child, source)),
            "import_spec_list" => collect_imports(child, source, imports),
            _ => {}
        }
    }
}

fn import_spec(node: Node, source: &[u8]) -> Option<ImportSpec> {
    let path = unquote(text(node.child_by_field_name("path")?, source))?;
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string());
    Some(ImportSpec { name, path })
}

/// Collect the comment group that ends on the line right above `decl`.
fn doc_comment(preceding: &[Node], decl: Node, source: &[u8]) -> Option<CommentGroup> {
    let mut expected_end = decl.start_position().row.checked_sub(1)?;
    let mut blocks: Vec<Vec<String>> = Vec::new();
    for node in preceding.iter().rev() {
        if node.kind() != "comment"
            || node.end_position().row != expected_end
            || !starts_line(*node, source)
        {
            break;
        }
        blocks.push(comment_lines(text(*node, source)));
        match node.start_position().row.checked_sub(1) {
            Some(row) => expected_end = row,
            None => break,
        }
    }
    if blocks.is_empty() {
        return None;
    }
    let lines = blocks.into_iter().rev().flatten().collect();
    Some(CommentGroup { lines })
}

/// Whether only whitespace precedes `node` on its line.
fn starts_line(node: Node, source: &[u8]) -> bool {
    let start = node.start_byte();
    source[..start]
        .iter()
        .rev()
        .take_while(|b| **b != b'\n')
        .all(|b| b.is_ascii_whitespace())
}

fn comment_lines(raw: &str) -> Vec<String> {
    if let Some(line) = raw.strip_prefix("//") {
        return vec![line.to_string()];
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|b| b.strip_suffix("*/"))
        .unwrap_or(raw);
    body.lines().map(str::to_string).collect()
}

fn function(node: Node, doc: Option<CommentGroup>, source: &[u8]) -> FuncDecl {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let signature = node
        .child_by_field_name("parameters")
        .map(|p| signature(p, source))
        .unwrap_or_default();
    let returns = node
        .child_by_field_name("body")
        .map(|b| return_statements(b, source))
        .unwrap_or_default();
    FuncDecl {
        name,
        has_receiver: node.kind() == "method_declaration",
        doc,
        signature,
        returns,
        line: node.start_position().row + 1,
    }
}

fn signature(list: Node, source: &[u8]) -> Signature {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        match decl.kind() {
            "parameter_declaration" => {
                let mut names_cursor = decl.walk();
                let names = decl
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|n| text(n, source).to_string())
                    .collect();
                let ty = decl
                    .child_by_field_name("type")
                    .map(|t| type_expr(t, source))
                    .unwrap_or_else(|| TypeExpr::Other(String::new()));
                params.push(ParamField { names, ty });
            }
            "variadic_parameter_declaration" => {
                let names = decl
                    .child_by_field_name("name")
                    .map(|n| vec![text(n, source).to_string()])
                    .unwrap_or_default();
                let ty = decl
                    .child_by_field_name("type")
                    .map(|t| format!("...{}", text(t, source)))
                    .unwrap_or_else(|| "...".to_string());
                params.push(ParamField {
                    names,
                    ty: TypeExpr::Other(ty),
                });
            }
            _ => {}
        }
    }
    Signature { params }
}

fn type_expr(node: Node, source: &[u8]) -> TypeExpr {
    match node.kind() {
        "type_identifier" => TypeExpr::Ident(text(node, source).to_string()),
        "qualified_type" => {
            let package = node.child_by_field_name("package").map(|n| text(n, source));
            let name = node.child_by_field_name("name").map(|n| text(n, source));
            match (package, name) {
                (Some(package), Some(name)) => TypeExpr::Qualified {
                    package: package.to_string(),
                    name: name.to_string(),
                },
                _ => match text(node, source).split_once('.') {
                    Some((package, name)) => TypeExpr::Qualified {
                        package: package.trim().to_string(),
                        name: name.trim().to_string(),
                    },
                    None => TypeExpr::Other(text(node, source).to_string()),
                },
            }
        }
        "pointer_type" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next();
            match inner {
                Some(inner) => TypeExpr::Pointer(Box::new(type_expr(inner, source))),
                None => TypeExpr::Other(text(node, source).to_string()),
            }
        }
        "parenthesized_type" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next();
            match inner {
                Some(inner) => type_expr(inner, source),
                None => TypeExpr::Other(text(node, source).to_string()),
            }
        }
        _ => TypeExpr::Other(text(node, source).to_string()),
    }
}

fn return_statements(body: Node, source: &[u8]) -> Vec<Vec<Expr>> {
    let mut out = Vec::new();
    let mut cursor = body.walk();
    for stmt in body.named_children(&mut cursor) {
        match stmt.kind() {
            "return_statement" => out.push(return_values(stmt, source)),
            "statement_list" => out.extend(return_statements(stmt, source)),
            _ => {}
        }
    }
    out
}

fn return_values(stmt: Node, source: &[u8]) -> Vec<Expr> {
    let mut values = Vec::new();
    let mut cursor = stmt.walk();
    for child in stmt.named_children(&mut cursor) {
        if child.kind() == "expression_list" {
            let mut list_cursor = child.walk();
            values.extend(
                child
                    .named_children(&mut list_cursor)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| expr(n, source)),
            );
        } else if child.kind() != "comment" {
            values.push(expr(child, source));
        }
    }
    values
}

fn expr(node: Node, source: &[u8]) -> Expr {
    match node.kind() {
        "composite_literal" => {
            let ty = node
                .child_by_field_name("type")
                .map(|t| type_expr(t, source))
                .unwrap_or_else(|| TypeExpr::Other(String::new()));
            let elements = node
                .child_by_field_name("body")
                .map(|b| elements(b, source))
                .unwrap_or_default();
            Expr::CompositeLit(CompositeLit { ty, elements })
        }
        "interpreted_string_literal" | "raw_string_literal" | "int_literal" | "float_literal"
        | "imaginary_literal" | "rune_literal" | "true" | "false" | "nil" => {
            Expr::BasicLit(text(node, source).to_string())
        }
        "parenthesized_expression" | "literal_element" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|n| n.kind() != "comment");
            match inner {
                Some(inner) => expr(inner, source),
                None => Expr::Other(text(node, source).to_string()),
            }
        }
        _ => Expr::Other(text(node, source).to_string()),
    }
}

fn elements(body: Node, source: &[u8]) -> Vec<Element> {
    let mut out = Vec::new();
    let mut cursor = body.walk();
    for element in body.named_children(&mut cursor) {
        match element.kind() {
            "keyed_element" => {
                let mut inner_cursor = element.walk();
                let parts: Vec<Node> = element
                    .named_children(&mut inner_cursor)
                    .filter(|n| n.kind() != "comment")
                    .collect();
                if let [key, value] = parts.as_slice() {
                    out.push(Element {
                        key: Some(text(*key, source).trim().to_string()),
                        value: expr(*value, source),
                    });
                }
            }
            "comment" => {}
            _ => out.push(Element {
                key: None,
                value: expr(element, source),
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::path::PathBuf;

    fn parse(src: &str) -> GoFile {
        parse_source(&PathBuf::from("test.go"), src.as_bytes()).expect("parse")
    }

    #[test]
    fn test_package_imports_and_functions() {
        let file = parse(
            r#"package router

import (
	"net/http"
	fw "github.com/ondbyte/matte/frameworks"
)

// @Router /hello [get]
func Hello(w http.ResponseWriter, r *http.Request) {
	w.Write([]byte("Hello!"))
}

func (s *Server) Method() {}
"#,
        );
        assert_eq!(file.package_name, "router");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "net/http");
        assert_eq!(file.imports[1].name.as_deref(), Some("fw"));
        assert_eq!(file.functions.len(), 2);

        let hello = &file.functions[0];
        assert_eq!(hello.name, "Hello");
        assert!(!hello.has_receiver);
        assert_eq!(hello.line, 9);
        assert_eq!(
            hello.doc.as_ref().unwrap().lines,
            vec![" @Router /hello [get]".to_string()]
        );
        let positions = hello.signature.positions();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].1.to_string(), "http.ResponseWriter");
        assert_eq!(positions[1].1.to_string(), "*http.Request");
        assert_eq!(positions[1].1.simple_name(), Some("Request"));

        assert!(file.functions[1].has_receiver);
        assert!(file.functions[1].doc.is_none());
    }

    #[test]
    fn test_doc_comment_requires_adjacency() {
        let file = parse(
            "package a\n\n// detached\n\nfunc A() {}\n\n// first\n// second\nfunc B() {}\n",
        );
        assert!(file.functions[0].doc.is_none());
        assert_eq!(
            file.functions[1].doc.as_ref().unwrap().lines,
            vec![" first".to_string(), " second".to_string()]
        );
    }

    #[test]
    fn test_grouped_and_pointer_params() {
        let file = parse("package a\n\nfunc F(yadu *string, chinmaya uint, a, b int) {}\n");
        let sig = &file.functions[0].signature;
        assert_eq!(sig.arity(), 4);
        let positions = sig.positions();
        assert_eq!(positions[0].0, Some("yadu"));
        assert!(positions[0].1.is_pointer());
        assert_eq!(positions[3].0, Some("b"));
        assert_eq!(positions[3].1, &TypeExpr::Ident("int".to_string()));
    }

    #[test]
    fn test_return_composite_literals() {
        let file = parse(
            r#"package main

func GeneralAPIInfo() (frameworks.HttpConfig, ParamsConfig) {
	return frameworks.HttpConfig{
			Addr: ":8080",
		},
		ParamsConfig{Addr: ":9090"}
}
"#,
        );
        let returns = &file.functions[0].returns;
        assert_eq!(returns.len(), 1);
        let Expr::CompositeLit(first) = &returns[0][0] else {
            panic!("expected composite literal");
        };
        assert_eq!(first.ty.simple_name(), Some("HttpConfig"));
        assert_eq!(first.elements[0].key.as_deref(), Some("Addr"));
        assert_eq!(first.elements[0].value, Expr::BasicLit("\":8080\"".to_string()));
        let Expr::CompositeLit(second) = &returns[0][1] else {
            panic!("expected composite literal");
        };
        assert_eq!(second.ty, TypeExpr::Ident("ParamsConfig".to_string()));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse_source(
            &PathBuf::from("broken.go"),
            b"package a\n\nfunc A( {\n",
        )
        .unwrap_err();
        match err {
            MatteError::Parse { file, line, .. } => {
                assert_eq!(file, PathBuf::from("broken.go"));
                assert!(line >= 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
