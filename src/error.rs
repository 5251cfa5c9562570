//! Error definitions for parsing, evaluation, and template rendering.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum TemplateError {
    /// Expression or format text does not match its grammar.
    #[error("syntax error at {pos}: {message}")]
    SyntaxError { message: String, pos: usize },
    /// A `{` with no `}` after it.
    #[error("unterminated placeholder starting at {pos}")]
    UnterminatedPlaceholder { pos: usize },
    /// The evaluator reached a node it cannot reduce to a number.
    #[error("malformed tree: {0}")]
    MalformedTree(String),
    /// Rendered output did not fit into the output capacity.
    #[error("output truncated at capacity {capacity}")]
    BufferTruncation { capacity: usize },
    /// Invalid options or bindings supplied by the caller.
    #[error("config error: {0}")]
    ConfigError(String),
    /// Filesystem I/O error from CLI or callers that propagate I/O.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    pub(crate) fn syntax(message: impl Into<String>, pos: usize) -> Self {
        Self::SyntaxError {
            message: message.into(),
            pos,
        }
    }
}
