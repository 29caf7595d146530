//! Image build status classification
//!
//! `pcluster describe-image` reports `imageBuildStatus` as a free-text
//! string. The poller only needs to know whether to keep waiting, stop, or
//! fail, and it decides that with substring checks evaluated in a fixed
//! order (see [`classify`]).

use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};

pub const BUILD_IN_PROGRESS: &str = "BUILD_IN_PROGRESS";
pub const BUILD_FAILED: &str = "BUILD_FAILED";
pub const BUILD_COMPLETE: &str = "BUILD_COMPLETE";
pub const DELETE_IN_PROGRESS: &str = "DELETE_IN_PROGRESS";
pub const DELETE_FAILED: &str = "DELETE_FAILED";
pub const DELETE_COMPLETE: &str = "DELETE_COMPLETE";

/// Outcome of classifying a build status string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// Build still running, keep polling
    InProgress,
    /// Terminal success
    Complete,
    /// Terminal failure reported by the service
    Failed,
    /// Neither running nor a recognizable terminal state
    Unrecognized,
}

impl BuildPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildPhase::InProgress)
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildPhase::InProgress => write!(f, "in-progress"),
            BuildPhase::Complete => write!(f, "complete"),
            BuildPhase::Failed => write!(f, "failed"),
            BuildPhase::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Classify a raw build status.
///
/// Order matters: `FAILED` wins over everything, `PROGRESS` wins over
/// `COMPLETE`, and a status mentioning neither `COMPLETE` nor `FAIL` is
/// treated as still running.
pub fn classify(status: &str) -> BuildPhase {
    if status == BUILD_FAILED || status.contains("FAILED") {
        BuildPhase::Failed
    } else if status == BUILD_IN_PROGRESS || status.contains("PROGRESS") {
        BuildPhase::InProgress
    } else if !status.contains("COMPLETE") && !status.contains("FAIL") {
        BuildPhase::InProgress
    } else if status.contains("COMPLETE") {
        BuildPhase::Complete
    } else {
        BuildPhase::Unrecognized
    }
}

/// Classify a status and turn terminal failures into errors.
///
/// Returns `Ok(true)` while the build is in progress and `Ok(false)` once it
/// completed.
pub fn check_status(status: &str) -> Result<bool> {
    tracing::info!("Pcluster build status: {}", status);
    match classify(status) {
        BuildPhase::InProgress => Ok(true),
        BuildPhase::Complete => Ok(false),
        BuildPhase::Failed => Err(BuildError::BuildFailed {
            status: status.to_string(),
        }),
        BuildPhase::Unrecognized => Err(BuildError::UnrecognizedStatus {
            status: status.to_string(),
        }),
    }
}
