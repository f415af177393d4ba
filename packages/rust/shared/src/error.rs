//! Error types for the question bank tools.
//!
//! Library crates use [`QuizBankError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all quizbank operations.
#[derive(Debug, thiserror::Error)]
pub enum QuizBankError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Source document could not be decoded or interpreted.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding/decoding error for a persisted file.
    #[error("JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Invalid input handed to an operation (empty chat message, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The external completion service failed or returned garbage.
    #[error("completion error: {0}")]
    Completion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuizBankError>;

impl QuizBankError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Wrap a `serde_json::Error` with the path of the offending file.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
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
        let err = QuizBankError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = QuizBankError::validation("message must not be empty");
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn io_error_mentions_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = QuizBankError::io("/tmp/习题.md", source);
        let text = err.to_string();
        assert!(text.contains("习题.md"));
        assert!(text.contains("gone"));
    }

    #[test]
    fn json_error_mentions_path() {
        let source = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = QuizBankError::json("questions.json", source);
        assert!(err.to_string().starts_with("JSON error at \"questions.json\""));
    }
}
