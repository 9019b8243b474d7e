//! Error types for reportmd library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for reportmd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while merging or exporting reports.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is JSON but does not follow the parsed-document schema.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The JSON is neither a parsed nor a merged document.
    #[error("Unknown document kind: expected a parsed or merged report")]
    UnknownKind,

    /// Error during rendering (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Classify the error for the processing summary.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Io(_) => FailureKind::IoFailure,
            Error::Json(_) | Error::MalformedInput(_) | Error::UnknownKind => {
                FailureKind::MalformedInput
            }
            Error::Render(_) => FailureKind::Other,
        }
    }
}

/// Why a document was recorded as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be parsed against the input schema.
    MalformedInput,
    /// The file could not be read or an output could not be written.
    IoFailure,
    /// Anything else.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::MalformedInput => "malformed_input",
            FailureKind::IoFailure => "io_failure",
            FailureKind::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedInput("missing `pages`".to_string());
        assert_eq!(err.to_string(), "Malformed input: missing `pages`");

        let err = Error::UnknownKind;
        assert_eq!(
            err.to_string(),
            "Unknown document kind: expected a parsed or merged report"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.failure_kind(), FailureKind::IoFailure);
    }

    #[test]
    fn test_render_error_is_other() {
        let err = Error::Render("bad value".to_string());
        assert_eq!(err.failure_kind(), FailureKind::Other);
        assert_eq!(FailureKind::Other.to_string(), "other");
    }

    #[test]
    fn test_json_error_is_malformed_input() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.failure_kind(), FailureKind::MalformedInput);
        assert_eq!(FailureKind::MalformedInput.to_string(), "malformed_input");
    }
}
