//! CloudWatch Logs error types

use amiflow_core::BuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudWatchError {
    #[error("Log stream not found: {0}")]
    StreamNotFound(String),

    #[error("CloudWatch Logs API error: {0}")]
    ApiError(String),
}

impl From<CloudWatchError> for BuildError {
    fn from(err: CloudWatchError) -> Self {
        BuildError::ApiError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloudWatchError>;
