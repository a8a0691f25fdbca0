//! Crate-level error types for wpconf diagnostics.

use std::path::PathBuf;

/// All errors in wpconf carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, directive, or reason for
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target configuration file does not exist at open time.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A CLI value could not be coerced to the requested type.
    #[error("invalid value `{raw}`: expected {expected}")]
    InvalidValue {
        /// What the requested type accepts.
        expected: &'static str,
        /// The raw command-line argument.
        raw: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// `save` was called on a document built from an in-memory string.
    #[error("document has no backing file (use save_to)")]
    NoBackingFile,

    /// The file content is not syntactically valid PHP.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization of a batch-change file failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A batch-change value has no PHP literal representation.
    #[error("unsupported value for `{key}`: {reason}")]
    UnsupportedValue {
        /// Directive name the value was destined for.
        key: String,
        /// Why the value cannot be rendered.
        reason: &'static str,
    },

    /// Writing the serialized document to disk failed.
    #[error("write failed: {}: {source}", path.display())]
    WriteFailed {
        /// Path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
