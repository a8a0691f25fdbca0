//! Tree-sitter PHP parsing and shared node helpers.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;

/// Expression statement kinds that wrap an `include`/`require` family
/// expression. Append-mode insertion targets the first of these in
/// document order.
const INCLUDE_KINDS: [&str; 4] = [
    "include_expression",
    "include_once_expression",
    "require_expression",
    "require_once_expression",
];

/// Parse PHP source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the grammar cannot be loaded, parsing
/// yields no tree, or the tree contains syntax errors.
pub(crate) fn parse_source(file: &Path, source: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| Error::ParseFailed {
            file: file.to_path_buf(),
            reason: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| Error::ParseFailed {
        file: file.to_path_buf(),
        reason: "tree-sitter returned no tree".to_string(),
    })?;

    if tree.root_node().has_error() {
        return Err(Error::ParseFailed {
            file: file.to_path_buf(),
            reason: syntax_error_reason(tree.root_node()),
        });
    }

    Ok(tree)
}

/// Describe the first error or missing node for a `ParseFailed` message.
fn syntax_error_reason(root: Node<'_>) -> String {
    match find_first_error_node(root) {
        Some(node) => {
            let line = node.start_position().row + 1;
            let column = node.start_position().column + 1;
            if node.is_missing() {
                format!("missing {} at line {line}, column {column}", node.kind())
            } else {
                format!("syntax error at line {line}, column {column}")
            }
        },
        None => "syntax error".to_string(),
    }
}

/// Pre-order search for the first ERROR or missing node.
fn find_first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_first_error_node(child) {
            return Some(found);
        }
    }
    None
}

/// Raw source text of a node.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Whether a statement node is an expression statement wrapping an
/// `include`/`require` expression.
pub(crate) fn is_include_statement(node: Node<'_>) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    node.named_child(0)
        .is_some_and(|expr| INCLUDE_KINDS.contains(&expr.kind()))
}

/// Whether a call expression's callee names `define`. Matches
/// case-insensitively and tolerates a fully-qualified `\define`.
pub(crate) fn callee_is_define(node: Node<'_>, source: &str) -> bool {
    if node.kind() != "function_call_expression" {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    let name = node_text(callee, source).trim_start_matches('\\');
    name.eq_ignore_ascii_case("define")
}

/// The positional argument expressions of a call, in order. Skips the
/// label of PHP 8 named arguments; the expression is what matters here.
pub(crate) fn call_arguments<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = arguments.walk();
    for argument in arguments.named_children(&mut cursor) {
        if argument.kind() != "argument" {
            continue;
        }
        // Last named child: a plain argument has exactly one, a named
        // argument carries its label first.
        let count = argument.named_child_count();
        if count == 0 {
            continue;
        }
        if let Some(expr) = argument.named_child(count - 1) {
            out.push(expr);
        }
    }
    out
}
