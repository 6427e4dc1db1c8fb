//! Error types for format operations

use thiserror::Error;

/// Errors that can occur while decoding, encoding or looking up formats.
///
/// Nothing in this crate recovers from these locally; they surface to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Source could not be read or sink could not be written
    #[error("I/O error: {0}")]
    Io(String),
    /// Malformed input text
    #[error("{format} syntax error at offset {offset}: {message}")]
    Syntax {
        format: String,
        offset: usize,
        message: String,
    },
    /// No format registered under that name
    #[error("Unknown format '{0}'")]
    UnsupportedFormat(String),
    /// A valid tree that the target format cannot represent
    #[error("Cannot encode: {0}")]
    UnsupportedShape(String),
    /// The format does not work in the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl FormatError {
    pub fn syntax(format: &str, offset: usize, message: impl Into<String>) -> Self {
        FormatError::Syntax {
            format: format.to_string(),
            offset,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}

impl From<std::fmt::Error> for FormatError {
    fn from(err: std::fmt::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}
