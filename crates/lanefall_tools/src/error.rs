//! Tool error types.

use std::path::PathBuf;

use lanefall_core::error::GameError;
use thiserror::Error;

/// Errors produced by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The match data was rejected.
    #[error("{path}: {source}")]
    Game {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: GameError,
    },

    /// Writing the JSON summary failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more files failed validation.
    #[error("{failed} of {checked} file(s) failed validation")]
    ValidationFailed {
        /// Files that failed.
        failed: usize,
        /// Files checked.
        checked: usize,
    },

    /// A command-line argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A replay did not reproduce its recorded final state.
    #[error("replay {0} diverged from its recorded final hash")]
    ReplayMismatch(PathBuf),
}

/// Result alias for tool operations.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn game(path: impl Into<PathBuf>, source: GameError) -> Self {
        Self::Game {
            path: path.into(),
            source,
        }
    }
}
