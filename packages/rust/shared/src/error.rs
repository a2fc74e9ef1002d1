//! Error types for the corpus pipeline.
//!
//! Library crates use [`CorpusError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all corpus operations.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Configuration or catalog loading/validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while retrieving a work.
    #[error("network error: {0}")]
    Network(String),

    /// Compressed archive could not be read or held no text member.
    #[error("archive error: {0}")]
    Archive(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad weight, unknown slot type, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CorpusError>;

impl CorpusError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CorpusError::config("catalog has no neutral genre");
        assert_eq!(err.to_string(), "config error: catalog has no neutral genre");

        let err = CorpusError::validation("weight 1.5 out of range");
        assert!(err.to_string().contains("weight 1.5"));

        let err = CorpusError::Archive("no .txt member".into());
        assert_eq!(err.to_string(), "archive error: no .txt member");
    }
}
