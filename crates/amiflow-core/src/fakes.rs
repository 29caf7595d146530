//! In-memory services for tests

use crate::error::{BuildError, Result};
use crate::image::{ImageDescription, ImageTarget};
use crate::logs::{LogBatch, LogCursor, LogStreamId};
use crate::service::{ImageBuildService, LogSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LOGS_ARN: &str =
    "arn:aws:logs:us-east-1:123456789012:log-group:/aws/imagebuilder/Foo-20221019";

/// Scripted reply; the last one repeats once the script runs out
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Err(String),
}

fn next_reply<T: Clone>(queue: &Mutex<VecDeque<Reply<T>>>) -> Option<Reply<T>> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

pub struct FakeBuilds {
    pub version: String,
    pub build_error: Option<String>,
    statuses: Mutex<VecDeque<Reply<ImageDescription>>>,
    pub builds: Mutex<Vec<(ImageTarget, PathBuf)>>,
    pub describes: Mutex<u32>,
}

impl FakeBuilds {
    pub fn new(statuses: Vec<Reply<ImageDescription>>) -> Self {
        Self {
            version: "3.2.1".to_string(),
            build_error: None,
            statuses: Mutex::new(statuses.into()),
            builds: Mutex::new(Vec::new()),
            describes: Mutex::new(0),
        }
    }

    /// Statuses for image "img", each with the standard logs ARN
    pub fn with_statuses(statuses: &[&str]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|s| Reply::Ok(ImageDescription::new("img", *s).with_logs_arn(LOGS_ARN)))
                .collect(),
        )
    }

    pub fn describe_count(&self) -> u32 {
        *self.describes.lock().unwrap()
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageBuildService for FakeBuilds {
    fn name(&self) -> &str {
        "fake"
    }

    async fn installed_version(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    async fn build_image(&self, target: &ImageTarget, config_file: &Path) -> Result<()> {
        self.builds
            .lock()
            .unwrap()
            .push((target.clone(), config_file.to_path_buf()));
        match &self.build_error {
            Some(e) => Err(BuildError::CommandFailed(e.clone())),
            None => Ok(()),
        }
    }

    async fn describe_image(&self, _target: &ImageTarget) -> Result<ImageDescription> {
        *self.describes.lock().unwrap() += 1;
        match next_reply(&self.statuses) {
            Some(Reply::Ok(desc)) => Ok(desc),
            Some(Reply::Err(e)) => Err(BuildError::ApiError(e)),
            None => Err(BuildError::ApiError("no scripted status".to_string())),
        }
    }
}

pub struct FakeLogs {
    batches: Mutex<VecDeque<Reply<LogBatch>>>,
    pub calls: Mutex<Vec<(LogStreamId, LogCursor)>>,
}

impl FakeLogs {
    pub fn new(batches: Vec<Reply<LogBatch>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![Reply::Ok(LogBatch::default())])
    }

    pub fn cursors(&self) -> Vec<i64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.as_millis())
            .collect()
    }
}

#[async_trait]
impl LogSource for FakeLogs {
    async fn fetch_since(&self, stream: &LogStreamId, since: LogCursor) -> Result<LogBatch> {
        self.calls.lock().unwrap().push((stream.clone(), since));
        match next_reply(&self.batches) {
            Some(Reply::Ok(batch)) => Ok(batch),
            Some(Reply::Err(e)) => Err(BuildError::ApiError(e)),
            None => Ok(LogBatch::default()),
        }
    }
}
