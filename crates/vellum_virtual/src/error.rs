//! Error types for vellum_virtual.

use thiserror::Error;

/// Errors from parsing [`CompilerOptions`](crate::CompilerOptions).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON or a field of the wrong type
    #[error("Invalid compiler options: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension entries are matched as suffixes
    #[error("Extension must start with '.': {0}")]
    InvalidExtension(String),
}

/// Errors from expanding a pug template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PugError {
    /// `(` without a matching `)`
    #[error("Unterminated attribute list starting at offset {offset}")]
    UnterminatedAttributes { offset: u32 },

    /// A quoted attribute value without its closing quote
    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString { offset: u32 },

    /// A line dedents to a column no enclosing line uses
    #[error("Inconsistent indentation on line {line}")]
    InconsistentIndentation { line: u32 },
}
