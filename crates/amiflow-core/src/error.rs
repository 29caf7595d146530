//! Build orchestration error types

use thiserror::Error;

/// Errors raised while driving or watching an image build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(
        "Mismatch between specified pcluster version and installed\n  Specified: {expected}, Installed: {installed}"
    )]
    VersionMismatch { expected: String, installed: String },

    #[error("Image build failed: {status}")]
    BuildFailed { status: String },

    #[error("Image status not compatible with bootstrap: {status}")]
    UnrecognizedStatus { status: String },

    #[error("Invalid build logs ARN: {0}")]
    InvalidLogsArn(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Watch of image {image_id} cancelled after {iterations} iteration(s)")]
    Cancelled { image_id: String, iterations: u32 },

    #[error("Watch of image {image_id} exceeded its deadline of {seconds}s")]
    DeadlineExceeded { image_id: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// Whether this error ends a build flow because of the build itself
    /// (as opposed to tooling, transport or the caller stopping the watch)
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            BuildError::BuildFailed { .. } | BuildError::UnrecognizedStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
