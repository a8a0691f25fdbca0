//! Surgical editing of `define()` directives in PHP configuration files.
//!
//! wpconf parses a configuration file (typically WordPress's
//! `wp-config.php`) with tree-sitter, locates `define(NAME, VALUE)`
//! call-sites by constant name, and evaluates or rewrites their value
//! arguments. Rewrites are byte-range edits against the original text, so
//! everything an edit doesn't touch (formatting, comments, surrounding
//! code) survives byte-for-byte.
//!
//! ```no_run
//! use wpconf::{DefineEditor, Value};
//!
//! # fn main() -> Result<(), wpconf::Error> {
//! let mut editor = DefineEditor::load("wp-config.php".as_ref())?;
//! editor
//!     .set("WP_DEBUG", Value::Bool(true))
//!     .set("FS_METHOD", Value::from("direct"));
//! editor.save()?;
//! # Ok(())
//! # }
//! ```

mod editor;
mod error;
mod eval;
mod parse;
mod value;

pub use editor::DefineEditor;
pub use error::Error;
pub use value::Value;
