//! The directive editor: load a PHP configuration file, look up and rewrite
//! `define()` directives, and write the result back without disturbing any
//! byte the edit didn't touch.
//!
//! One editor exclusively owns one in-memory document for its lifetime.
//! Callers batching several directive changes apply every `set`/`replace`
//! on one editor before a single `save`; there is no cross-instance
//! coordination, and the last writer wins on disk.

use std::path::{Path, PathBuf};

use tree_sitter::Node;

use crate::error::Error;
use crate::eval;
use crate::parse;
use crate::value::{Value, quote_single};

/// A pending byte-range rewrite against the document source.
struct Edit {
    /// End byte (exclusive); equal to `start` for pure insertions.
    end: usize,
    /// Start byte of the replaced range.
    start: usize,
    /// Replacement text.
    text: String,
}

/// An editing session over one PHP configuration file.
///
/// The source string is the single source of truth; each operation parses
/// it fresh and mutations are applied as byte-range edits, so untouched
/// regions survive byte-for-byte. The document is validated at
/// construction, and every injected fragment is a well-formed statement or
/// literal, so the text stays parseable across mutations.
#[derive(Debug)]
pub struct DefineEditor {
    /// Backing file, when the document was loaded from disk.
    path: Option<PathBuf>,
    /// Current document text, kept valid PHP by construction.
    source: String,
}

impl DefineEditor {
    /// Open and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the path does not exist,
    /// `Error::Io` for other read failures,
    /// or `Error::ParseFailed` if the content is not valid PHP.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(s) => s,
        };
        parse::parse_source(path, &source)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Build an editor over an in-memory document. The document has no
    /// backing file; persist it with [`DefineEditor::save_to`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the content is not valid PHP.
    pub fn from_source(source: impl Into<String>) -> Result<Self, Error> {
        let source = source.into();
        parse::parse_source(Path::new("<memory>"), &source)?;
        Ok(Self { path: None, source })
    }

    /// Look up the value of `define(name, …)`, first occurrence in
    /// document order. Returns the evaluated constant when the value
    /// expression is compile-time constant, `Value::Raw` with the
    /// expression's source text when it is not, and `None` when no
    /// matching directive exists.
    pub fn get(&self, name: &str) -> Option<Value> {
        let tree = self.parse().ok()?;
        let expr = find_first_define(tree.root_node(), &self.source, name)?;
        let value = eval::evaluate(expr, &self.source)
            .unwrap_or_else(|_| Value::Raw(parse::node_text(expr, &self.source).to_string()));
        Some(value)
    }

    /// Look up a directive, falling back to `default` when absent.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.get(name).unwrap_or(default)
    }

    /// Replace the value of every `define(name, …)` in the document. If no
    /// directive matches before the first `include`/`require` statement, a
    /// new `define(name, value);` is inserted immediately before that
    /// statement. Chainable.
    pub fn set(&mut self, name: &str, value: Value) -> &mut Self {
        self.rewrite(name, &value, true);
        self
    }

    /// Replace the value of every `define(name, …)` in the document,
    /// without inserting anything when the name is absent. Chainable.
    pub fn replace(&mut self, name: &str, value: Value) -> &mut Self {
        self.rewrite(name, &value, false);
        self
    }

    /// The current document text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Write the document back to its backing file.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoBackingFile` for in-memory documents,
    /// or `Error::WriteFailed` on I/O failure.
    pub fn save(&self) -> Result<(), Error> {
        let Some(path) = self.path.clone() else {
            return Err(Error::NoBackingFile);
        };
        self.save_to(&path)
    }

    /// Write the document to an arbitrary path.
    ///
    /// # Errors
    ///
    /// Returns `Error::WriteFailed` on I/O failure.
    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, &self.source).map_err(|source| Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the current source. Cannot fail in practice: the text was
    /// valid at construction and mutations only inject well-formed
    /// fragments.
    fn parse(&self) -> Result<tree_sitter::Tree, Error> {
        let anchor = self.path.as_deref().unwrap_or(Path::new("<memory>"));
        parse::parse_source(anchor, &self.source)
    }

    /// Single-traversal rewrite: replace every matching directive's value,
    /// optionally inserting a new directive before the first include.
    fn rewrite(&mut self, name: &str, value: &Value, append: bool) {
        let Ok(tree) = self.parse() else {
            // Unreachable by the construction invariant; a no-op beats a
            // panic if it is ever violated.
            return;
        };

        let mut walker = RewriteWalker {
            append,
            edits: Vec::new(),
            inserted: false,
            matched: 0,
            name,
            rendered: value.php_literal(),
            source: &self.source,
        };
        walker.visit(tree.root_node());

        let mut edits = walker.edits;
        // Back-to-front so earlier offsets stay valid.
        edits.sort_by(|a, b| b.start.cmp(&a.start));
        for edit in edits {
            self.source.replace_range(edit.start..edit.end, &edit.text);
        }
    }
}

/// State for one rewrite traversal.
struct RewriteWalker<'a> {
    /// Whether to insert a new directive when none matched yet.
    append: bool,
    /// Collected byte edits, in visit order.
    edits: Vec<Edit>,
    /// Whether the insertion already fired; it fires at most once even
    /// when several include statements exist.
    inserted: bool,
    /// Number of matching `define` calls seen so far. A match before the
    /// first include suppresses insertion; insertion at an earlier
    /// include is independent of matches found later.
    matched: usize,
    /// Target constant name.
    name: &'a str,
    /// Rendered replacement value.
    rendered: String,
    /// Document source the node ranges index into.
    source: &'a str,
}

impl RewriteWalker<'_> {
    /// Pre-order traversal in document order. Never early-exits: the
    /// include check and the match search are independent, and every
    /// matching directive gets rewritten.
    fn visit(&mut self, node: Node<'_>) {
        if self.append && !self.inserted && self.matched == 0 && parse::is_include_statement(node)
        {
            let insertion = self.insertion_before(node);
            self.edits.push(insertion);
            self.inserted = true;
        }

        if let Some(expr) = match_define_value(node, self.source, self.name) {
            self.matched += 1;
            self.edits.push(Edit {
                start: expr.start_byte(),
                end: expr.end_byte(),
                text: self.rendered.clone(),
            });
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Build the insertion edit for a new directive directly before a
    /// statement, reusing the statement's own indentation.
    fn insertion_before(&self, stmt: Node<'_>) -> Edit {
        let start = stmt.start_byte();
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.source[line_start..start];
        let indent = if prefix.chars().all(|c| c == ' ' || c == '\t') {
            prefix
        } else {
            ""
        };
        Edit {
            start,
            end: start,
            text: format!(
                "define({}, {});\n{indent}",
                quote_single(self.name),
                self.rendered
            ),
        }
    }
}

/// If `node` is `define(name, value)` for the target name, return the
/// value expression node.
fn match_define_value<'t>(node: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    if !parse::callee_is_define(node, source) {
        return None;
    }
    let args = parse::call_arguments(node);
    let (first, second) = (args.first()?, args.get(1)?);
    let found = eval::decode_string_literal(*first, source).ok()?;
    if found == name { Some(*second) } else { None }
}

/// Document-order search for the first matching `define`; stops at the
/// first hit, unlike mutation.
fn find_first_define<'t>(node: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    if let Some(expr) = match_define_value(node, source, name) {
        return Some(expr);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_first_define(child, source, name) {
            return Some(found);
        }
    }
    None
}
