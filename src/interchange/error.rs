//! Error types for interchange operations.

use thiserror::Error;

/// Errors that can occur while reading, writing or loading CellML documents.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document text is not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Import URL could not be turned into a loadable location.
    #[error("Unresolved import: {0}")]
    UnresolvedImport(String),

    /// Unsupported feature or format variant.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl InterchangeError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create an unresolved import error.
    pub fn unresolved_import(url: impl Into<String>) -> Self {
        Self::UnresolvedImport(url.into())
    }
}
