//! External service traits
//!
//! The image build and its logs live in external services. The flows only
//! talk to them through these traits, so the pcluster CLI and CloudWatch
//! Logs can be swapped for in-memory fakes.

use crate::error::Result;
use crate::image::{ImageDescription, ImageTarget};
use crate::logs::{LogBatch, LogCursor, LogEvent, LogStreamId};
use async_trait::async_trait;
use std::path::Path;

/// Image build service (ParallelCluster)
#[async_trait]
pub trait ImageBuildService: Send + Sync {
    /// Returns the service name (e.g., "pcluster")
    fn name(&self) -> &str;

    /// Version string reported by the installed tool
    async fn installed_version(&self) -> Result<String>;

    /// Launch an image build
    async fn build_image(&self, target: &ImageTarget, config_file: &Path) -> Result<()>;

    /// Fetch the current description of an image
    async fn describe_image(&self, target: &ImageTarget) -> Result<ImageDescription>;
}

/// Source of build log lines (CloudWatch Logs)
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the lines of `stream` at or after `since`
    async fn fetch_since(&self, stream: &LogStreamId, since: LogCursor) -> Result<LogBatch>;
}

/// Log source for flows that never tail logs (start, describe)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLogs;

#[async_trait]
impl LogSource for NoLogs {
    async fn fetch_since(&self, _stream: &LogStreamId, _since: LogCursor) -> Result<LogBatch> {
        Ok(LogBatch::default())
    }
}

/// Destination for fetched build log lines
pub trait LogSink: Send {
    fn write_event(&mut self, stream: &LogStreamId, event: &LogEvent);
}

/// Collects log lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<LogEvent>,
}

impl LogSink for MemorySink {
    fn write_event(&mut self, _stream: &LogStreamId, event: &LogEvent) {
        self.events.push(event.clone());
    }
}

/// Discards log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write_event(&mut self, _stream: &LogStreamId, _event: &LogEvent) {}
}
