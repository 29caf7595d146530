//! Build status polling and log tailing
//!
//! Polls `describe-image` until the build reaches a terminal status. Every
//! iteration also tails the build log from the last seen timestamp. Log
//! failures never stop the loop, since CloudWatch streams expire.

use crate::error::{BuildError, Result};
use crate::image::{ImageDescription, ImageTarget};
use crate::logs::{LogCursor, LogStreamId};
use crate::service::{ImageBuildService, LogSink, LogSource};
use crate::status::check_status;
use crate::wait::{StopSignal, WaitOutcome, deadline_after, wait_interval};
use std::time::Duration;

/// Default interval between status checks (10 minutes)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// How a watch waits between iterations
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Wait between status checks
    pub poll_interval: Duration,

    /// Overall limit on the watch; `None` polls until a terminal status
    pub timeout: Option<Duration>,

    /// Stops the watch between iterations
    pub stop: Option<StopSignal>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            stop: None,
        }
    }
}

impl WatchOptions {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Summary of a finished poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchReport {
    /// Status checks performed
    pub iterations: u32,

    /// Log position reached
    pub cursor: LogCursor,

    /// Status that ended the loop
    pub last_status: String,
}

/// Poll until the build completes.
///
/// Returns once a complete status is seen. Failed or unrecognized statuses,
/// status query errors, a stop request and an expired timeout end the loop
/// with an error.
pub async fn watch_build(
    builds: &dyn ImageBuildService,
    logs: &dyn LogSource,
    sink: &mut dyn LogSink,
    target: &ImageTarget,
    options: &WatchOptions,
) -> Result<WatchReport> {
    let deadline = options.timeout.and_then(deadline_after);
    let mut stop = options.stop.clone();
    let mut cursor = LogCursor::START;
    let mut iteration: u32 = 1;

    loop {
        tracing::info!(
            "Pcluster: {}, Region: {}, N: {}",
            target.image_id,
            target.region,
            iteration
        );

        let description = builds.describe_image(target).await?;
        tracing::debug!(?description, "describe-image");

        match tail_logs(logs, sink, &description, cursor).await {
            Ok(Some(latest)) => cursor = latest,
            Ok(None) => {}
            // Logs only exist for a certain time
            Err(e) => tracing::debug!("Skipping build logs for {}: {}", target, e),
        }

        let in_progress = check_status(&description.image_build_status)?;
        tracing::info!("Image Build:[{}] Build in process: {}", target, in_progress);

        if !in_progress {
            return Ok(WatchReport {
                iterations: iteration,
                cursor,
                last_status: description.image_build_status,
            });
        }

        if stop.as_ref().is_some_and(StopSignal::is_stopped) {
            return Err(BuildError::Cancelled {
                image_id: target.image_id.clone(),
                iterations: iteration,
            });
        }

        match wait_interval(options.poll_interval, deadline, stop.as_mut()).await {
            WaitOutcome::Elapsed => {}
            WaitOutcome::Stopped => {
                return Err(BuildError::Cancelled {
                    image_id: target.image_id.clone(),
                    iterations: iteration,
                });
            }
            WaitOutcome::DeadlineReached => {
                return Err(BuildError::DeadlineExceeded {
                    image_id: target.image_id.clone(),
                    seconds: options.timeout.unwrap_or_default().as_secs(),
                });
            }
        }

        iteration += 1;
    }
}

/// Write the log lines newer than `cursor` to `sink`.
///
/// Returns the advanced cursor, or `None` when the description carries no
/// logs ARN and nothing was fetched.
pub async fn tail_logs(
    logs: &dyn LogSource,
    sink: &mut dyn LogSink,
    description: &ImageDescription,
    cursor: LogCursor,
) -> Result<Option<LogCursor>> {
    let Some(arn) = description
        .image_build_logs_arn
        .as_deref()
        .filter(|arn| !arn.trim().is_empty())
    else {
        return Ok(None);
    };

    let stream = LogStreamId::from_arn(arn)?;
    let batch = logs.fetch_since(&stream, cursor).await?;
    for event in &batch.events {
        sink.write_event(&stream, event);
    }

    let mut next = cursor;
    next.advance(batch.latest_timestamp());
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeBuilds, FakeLogs, LOGS_ARN, Reply};
    use crate::logs::{LogBatch, LogEvent};
    use crate::service::{MemorySink, NullSink};
    use crate::status::{BUILD_COMPLETE, BUILD_FAILED, BUILD_IN_PROGRESS};
    use crate::wait::stop_channel;
    use tokio::time::Instant;

    fn target() -> ImageTarget {
        ImageTarget::new("img", "us-east-1")
    }

    fn batch(events: &[(i64, &str)]) -> Reply<LogBatch> {
        Reply::Ok(LogBatch::new(
            events.iter().map(|(t, m)| LogEvent::new(*t, *m)).collect(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_on_first_poll() {
        let builds = FakeBuilds::with_statuses(&[BUILD_COMPLETE]);
        let logs = FakeLogs::new(vec![batch(&[(100, "done")])]);
        let mut sink = MemorySink::default();
        let start = Instant::now();

        let report = watch_build(&builds, &logs, &mut sink, &target(), &WatchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.iterations, 1);
        assert_eq!(report.cursor.as_millis(), 100);
        assert_eq!(report.last_status, BUILD_COMPLETE);
        assert_eq!(builds.describe_count(), 1);
        assert_eq!(sink.events.len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_progress_sleeps_ten_minutes() {
        let builds =
            FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS, BUILD_IN_PROGRESS, BUILD_COMPLETE]);
        let logs = FakeLogs::empty();
        let start = Instant::now();

        let report = watch_build(&builds, &logs, &mut NullSink, &target(), &WatchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.iterations, 3);
        assert_eq!(builds.describe_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_is_error() {
        let builds = FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS, BUILD_FAILED]);
        let logs = FakeLogs::empty();

        let err = watch_build(&builds, &logs, &mut NullSink, &target(), &WatchOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::BuildFailed { .. }));
        assert!(err.to_string().contains("BUILD_FAILED"));
        assert_eq!(builds.describe_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_status_is_error() {
        let builds = FakeBuilds::with_statuses(&["BUILD_FAILURE"]);
        let err = watch_build(
            &builds,
            &FakeLogs::empty(),
            &mut NullSink,
            &target(),
            &WatchOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::UnrecognizedStatus { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_query_error_is_fatal() {
        let builds = FakeBuilds::new(vec![Reply::Err("throttled".to_string())]);
        let logs = FakeLogs::empty();

        let err = watch_build(&builds, &logs, &mut NullSink, &target(), &WatchOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::ApiError(_)));
        assert!(logs.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_advances_and_survives_log_errors() {
        let builds = FakeBuilds::with_statuses(&[
            BUILD_IN_PROGRESS,
            BUILD_IN_PROGRESS,
            BUILD_IN_PROGRESS,
            BUILD_COMPLETE,
        ]);
        let logs = FakeLogs::new(vec![
            batch(&[(100, "a"), (200, "b")]),
            Reply::Err("ResourceNotFoundException".to_string()),
            batch(&[(150, "late")]),
            batch(&[(300, "c")]),
        ]);
        let mut sink = MemorySink::default();

        let report = watch_build(&builds, &logs, &mut sink, &target(), &WatchOptions::default())
            .await
            .unwrap();

        assert_eq!(logs.cursors(), vec![0, 200, 200, 200]);
        assert_eq!(report.cursor.as_millis(), 300);
        let messages: Vec<_> = sink.events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "late", "c"]);

        let (stream, _) = logs.calls.lock().unwrap()[0].clone();
        assert_eq!(stream.group, "/aws/imagebuilder");
        assert_eq!(stream.stream, "Foo-20221019");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_logs_arn_skips_fetch() {
        let builds = FakeBuilds::new(vec![
            Reply::Ok(ImageDescription::new("img", BUILD_IN_PROGRESS)),
            Reply::Ok(ImageDescription::new("img", BUILD_COMPLETE).with_logs_arn("")),
        ]);
        let logs = FakeLogs::empty();

        let report = watch_build(&builds, &logs, &mut NullSink, &target(), &WatchOptions::default())
            .await
            .unwrap();

        assert!(logs.calls.lock().unwrap().is_empty());
        assert_eq!(report.cursor, LogCursor::START);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_logs_arn_does_not_stop_polling() {
        let builds = FakeBuilds::new(vec![Reply::Ok(
            ImageDescription::new("img", BUILD_COMPLETE).with_logs_arn("not-an-arn"),
        )]);
        let logs = FakeLogs::empty();

        let report = watch_build(&builds, &logs, &mut NullSink, &target(), &WatchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.iterations, 1);
        assert!(logs.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_and_complete_keeps_polling() {
        let builds = FakeBuilds::with_statuses(&["COMPLETE_IN_PROGRESS", BUILD_COMPLETE]);
        let report = watch_build(
            &builds,
            &FakeLogs::empty(),
            &mut NullSink,
            &target(),
            &WatchOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(report.iterations, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_ends_watch() {
        let builds = FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS]);
        let options = WatchOptions::default().with_timeout(Duration::from_secs(1500));
        let start = Instant::now();

        let err = watch_build(&builds, &FakeLogs::empty(), &mut NullSink, &target(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::DeadlineExceeded { seconds: 1500, .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(1500));
        assert_eq!(builds.describe_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_poll_interval_still_times_out() {
        let builds = FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS]);
        let options = WatchOptions::default()
            .with_poll_interval(Duration::from_secs(u64::MAX))
            .with_timeout(Duration::from_secs(1));
        let start = Instant::now();

        let err = watch_build(&builds, &FakeLogs::empty(), &mut NullSink, &target(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::DeadlineExceeded { seconds: 1, .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_polls_to_completion() {
        let builds = FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS, BUILD_COMPLETE]);
        let options = WatchOptions::default().with_timeout(Duration::from_secs(u64::MAX));
        let start = Instant::now();

        let report = watch_build(&builds, &FakeLogs::empty(), &mut NullSink, &target(), &options)
            .await
            .unwrap();

        assert_eq!(report.iterations, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_wait_cancels() {
        let builds = FakeBuilds::with_statuses(&[BUILD_IN_PROGRESS]);
        let (handle, signal) = stop_channel();
        handle.stop();
        let options = WatchOptions::default()
            .with_poll_interval(Duration::from_secs(5))
            .with_stop(signal);

        let err = watch_build(&builds, &FakeLogs::empty(), &mut NullSink, &target(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Cancelled { iterations: 1, .. }));
        assert!(!err.is_build_failure());
    }

    #[tokio::test]
    async fn test_tail_logs_uses_cursor() {
        let logs = FakeLogs::new(vec![batch(&[(42, "x")])]);
        let desc = ImageDescription::new("img", BUILD_IN_PROGRESS).with_logs_arn(LOGS_ARN);
        let mut sink = MemorySink::default();

        let next = tail_logs(&logs, &mut sink, &desc, LogCursor::from_millis(10))
            .await
            .unwrap();

        assert_eq!(next, Some(LogCursor::from_millis(42)));
        assert_eq!(logs.cursors(), vec![10]);
    }
}
