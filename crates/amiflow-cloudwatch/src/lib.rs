//! CloudWatch Logs source for amiflow
//!
//! Implements the `LogSource` trait with the AWS SDK so the build watcher
//! can tail EC2 Image Builder logs (`/aws/imagebuilder/<image>`).
//!
//! # Example
//!
//! ```ignore
//! use amiflow_cloudwatch::CloudWatchLogs;
//! use amiflow_core::{LogCursor, LogSource, LogStreamId};
//!
//! let logs = CloudWatchLogs::from_region("us-east-1").await;
//! let stream = LogStreamId::from_arn(arn)?;
//! let batch = logs.fetch_since(&stream, LogCursor::START).await?;
//! ```

pub mod error;
pub mod logs;

pub use error::{CloudWatchError, Result};
pub use logs::CloudWatchLogs;
