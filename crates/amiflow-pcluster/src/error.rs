//! ParallelCluster CLI error types

use amiflow_core::BuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PclusterError {
    #[error("pcluster not found ({0}). Please install: pip install aws-parallelcluster")]
    PclusterNotFound(String),

    #[error("pcluster command failed: {0}")]
    CommandFailed(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Unexpected pcluster output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<PclusterError> for BuildError {
    fn from(err: PclusterError) -> Self {
        match err {
            PclusterError::PclusterNotFound(bin) => BuildError::ToolNotFound(bin),
            PclusterError::CommandFailed(msg) => BuildError::CommandFailed(msg),
            PclusterError::JsonError(e) => BuildError::Json(e),
            PclusterError::IoError(e) => BuildError::Io(e),
            other => BuildError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PclusterError>;
