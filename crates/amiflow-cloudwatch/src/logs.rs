//! CloudWatch Logs client
//!
//! Reads image build logs with `GetLogEvents`, oldest first, following the
//! forward token until the stream has no newer events.

use crate::error::{CloudWatchError, Result};
use amiflow_core::{LogBatch, LogCursor, LogEvent, LogSource, LogStreamId};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::OutputLogEvent;

/// Upper bound on pages read per fetch
const MAX_PAGES: usize = 50;

/// CloudWatch Logs reader
#[derive(Clone)]
pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client for `region`, credentials from the default provider chain
    pub async fn from_region(region: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    /// Fetch every event of `stream` newer than `since`
    pub async fn get_log_events(&self, stream: &LogStreamId, since: LogCursor) -> Result<LogBatch> {
        let mut events = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let output = self
                .client
                .get_log_events()
                .log_group_name(&stream.group)
                .log_stream_name(&stream.stream)
                .start_time(start_time(since))
                .start_from_head(true)
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(|e| {
                    let not_found = e
                        .as_service_error()
                        .is_some_and(|se| se.is_resource_not_found_exception());
                    if not_found {
                        CloudWatchError::StreamNotFound(stream.to_string())
                    } else {
                        CloudWatchError::ApiError(DisplayErrorContext(&e).to_string())
                    }
                })?;

            let page = convert_events(output.events());
            let next = output.next_forward_token().map(str::to_string);

            tracing::debug!("Fetched {} log events from {}", page.len(), stream);
            events.extend(page);

            // Empty pages can still be followed by events
            if is_last_page(token.as_deref(), next.as_deref()) {
                break;
            }
            token = next;
        }

        Ok(LogBatch::new(events))
    }
}

#[async_trait]
impl LogSource for CloudWatchLogs {
    async fn fetch_since(
        &self,
        stream: &LogStreamId,
        since: LogCursor,
    ) -> amiflow_core::Result<LogBatch> {
        Ok(self.get_log_events(stream, since).await?)
    }
}

/// `startTime` for a fetch after `since`.
///
/// GetLogEvents includes events at exactly `startTime`, and the cursor already
/// points at the newest event written.
fn start_time(since: LogCursor) -> i64 {
    match since.as_millis() {
        0 => 0,
        millis => millis.saturating_add(1),
    }
}

/// The stream is exhausted when the forward token stops changing
fn is_last_page(sent: Option<&str>, next: Option<&str>) -> bool {
    match next {
        None => true,
        Some(next) => sent == Some(next),
    }
}

/// Convert SDK events, dropping ones without a timestamp
fn convert_events(events: &[OutputLogEvent]) -> Vec<LogEvent> {
    events
        .iter()
        .filter_map(|event| {
            let timestamp = event.timestamp()?;
            let message = event.message().unwrap_or_default().trim_end();
            Some(LogEvent::new(timestamp, message))
        })
        .collect()
}
