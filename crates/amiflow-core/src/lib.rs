//! amiflow core
//!
//! Drives an AMI build through ParallelCluster and watches it until it
//! reaches a terminal state, tailing the build log from CloudWatch Logs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   amiflow CLI                    │
//! │        (start / build / watch / describe)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 amiflow-core                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   BuildFlows: version guard → driver →   │   │
//! │  │            poller → describe             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  trait ImageBuildService    trait LogSource      │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   pcluster    │ │  cloudwatch   │
//! │   (CLI)       │ │  (AWS SDK)    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod flow;
pub mod image;
pub mod logs;
pub mod poller;
pub mod service;
pub mod status;
pub mod version;
pub mod wait;

#[cfg(test)]
mod fakes;

// Re-exports
pub use driver::start_build;
pub use error::{BuildError, Result};
pub use flow::BuildFlows;
pub use image::{
    AmiInfo, BuildRequest, DEFAULT_PCLUSTER_VERSION, DEFAULT_REGION, ImageDescription,
    ImageTarget, WatchRequest,
};
pub use logs::{LogBatch, LogCursor, LogEvent, LogStreamId};
pub use poller::{DEFAULT_POLL_INTERVAL, WatchOptions, WatchReport, tail_logs, watch_build};
pub use service::{ImageBuildService, LogSink, LogSource, MemorySink, NoLogs, NullSink};
pub use status::{BuildPhase, check_status, classify};
pub use version::{check_version, ensure_version};
pub use wait::{
    StopHandle, StopSignal, WaitOutcome, deadline_after, stop_channel, wait_interval,
};
