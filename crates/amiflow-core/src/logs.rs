//! Build log stream identity and cursor

use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};

/// CloudWatch log group and stream holding an image build's log.
///
/// Derived from `imageBuildLogsArn`, e.g.
/// `arn:aws:logs:us-east-1:123456789012:log-group:/aws/imagebuilder/Foo-20221019`
/// yields group `/aws/imagebuilder` and stream `Foo-20221019`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStreamId {
    pub group: String,
    pub stream: String,
}

impl LogStreamId {
    pub fn new(group: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            stream: stream.into(),
        }
    }

    /// Parse a build logs ARN
    pub fn from_arn(arn: &str) -> Result<Self> {
        let arn = arn.trim();
        // Log group ARNs are sometimes reported with a `:*` suffix
        let arn = arn.strip_suffix(":*").unwrap_or(arn);

        let resource = arn.rsplit(':').next().unwrap_or_default();
        let (group, stream) = resource
            .rsplit_once('/')
            .ok_or_else(|| BuildError::InvalidLogsArn(arn.to_string()))?;

        let group = group.trim_end_matches('/');
        if group.is_empty() || stream.is_empty() {
            return Err(BuildError::InvalidLogsArn(arn.to_string()));
        }

        Ok(Self::new(group, stream))
    }
}

impl std::fmt::Display for LogStreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group, self.stream)
    }
}

/// Last consumed position in a log stream (epoch milliseconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogCursor(i64);

impl LogCursor {
    pub const START: LogCursor = LogCursor(0);

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Move forward to `latest`; never moves backwards
    pub fn advance(&mut self, latest: Option<i64>) {
        if let Some(latest) = latest {
            self.0 = self.0.max(latest);
        }
    }
}

impl std::fmt::Display for LogCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub message: String,
}

impl LogEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

/// Log lines returned by one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBatch {
    pub events: Vec<LogEvent>,
}

impl LogBatch {
    pub fn new(events: Vec<LogEvent>) -> Self {
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Newest timestamp in the batch
    pub fn latest_timestamp(&self) -> Option<i64> {
        self.events.iter().map(|e| e.timestamp).max()
    }
}
