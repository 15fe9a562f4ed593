//! Error types for substrate-tasks
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, unknown task)
//! - 4: Operation failed (fetch error, unreadable snapshot)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the substrate-tasks CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for substrate-tasks operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found in loaded set: {0}")]
    TaskNotFound(String),

    #[error("No task source configured (set --url or --file)")]
    NoSource,

    // Operation failures (exit code 4)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Snapshot not readable: {0}")]
    SnapshotUnreadable(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::NoSource => exit_codes::USER_ERROR,

            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::SnapshotUnreadable(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON output, when the variant carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::HttpStatus { status, url, body } => Some(serde_json::json!({
                "status": status,
                "url": url,
                "body": body,
            })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::SnapshotUnreadable(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for substrate-tasks operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
