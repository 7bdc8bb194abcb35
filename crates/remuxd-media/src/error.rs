//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while inspecting or remuxing a file.
///
/// All of these are per-file failures: the caller logs them, skips the
/// file, and continues with the rest of the work item.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("mkvmerge not found in PATH")]
    ToolNotFound,

    #[error("Track inspection failed for {path}: {message}")]
    InspectFailed {
        path: PathBuf,
        message: String,
        stderr: Option<String>,
    },

    #[error("Remux failed for {path}: {message}")]
    RemuxFailed {
        path: PathBuf,
        message: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to replace {path}: {message}")]
    ReplaceFailed { path: PathBuf, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    pub fn inspect_failed(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::InspectFailed {
            path: path.into(),
            message: message.into(),
            stderr,
        }
    }

    pub fn remux_failed(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RemuxFailed {
            path: path.into(),
            message: message.into(),
            exit_code,
        }
    }

    pub fn replace_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ReplaceFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}
