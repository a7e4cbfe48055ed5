//! Error types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of an operation failure.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The named sheet, cell range, or operation does not exist.
    NotFound,
    /// Arguments were missing, mistyped, or unparseable.
    Validation,
    /// Reading or writing the file failed.
    Io,
    /// The file could not be parsed as the expected format.
    Format,
    /// The operation cannot be applied to this file.
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Io => "io",
            ErrorKind::Format => "format",
            ErrorKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// A failed operation call.
///
/// Structured at the adapter boundary; its `Display` form
/// (`"Error: {detail}"`) is what lands in conversation history for the
/// reasoning engine to read and react to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error: {detail}")]
pub struct OperationError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub detail: String,
}

impl OperationError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// [`ErrorKind::NotFound`]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, detail)
    }

    /// [`ErrorKind::Validation`]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, detail)
    }

    /// [`ErrorKind::Io`]
    pub fn io(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, detail)
    }

    /// [`ErrorKind::Format`]
    pub fn format(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, detail)
    }

    /// [`ErrorKind::Unsupported`]
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, detail)
    }
}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        OperationError::io(err.to_string())
    }
}

/// Agent run errors. These fail the whole request.
///
/// Operation failures are not in here: they are fed back to the engine
/// as result text and the run continues.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgentError {
    /// The reasoning engine failed and retrying will not help.
    #[error("model error: {0}")]
    Model(String),

    /// The reasoning engine failed but retrying might succeed.
    #[error("retryable: {0}")]
    Retryable(String),
}
