//! Cancellable wait between poll iterations

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Stops a running watch
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes a [`StopHandle`]
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once stop has been requested. Never resolves if the handle
    /// was dropped without stopping.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Create a connected stop handle and signal
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Why a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full interval passed
    Elapsed,
    /// Stop was requested
    Stopped,
    /// The deadline came before the interval ended
    DeadlineReached,
}

/// Roughly 30 years, the cap for intervals that overflow `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + interval`, capped at [`FAR_FUTURE`] from now
fn wake_after(interval: Duration) -> Instant {
    Instant::now() + interval.min(FAR_FUTURE)
}

/// `now + timeout`, or `None` when the sum does not fit in an `Instant`
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Sleep for `interval`, waking early at `deadline` or when `stop` fires
pub async fn wait_interval(
    interval: Duration,
    deadline: Option<Instant>,
    stop: Option<&mut StopSignal>,
) -> WaitOutcome {
    let mut wake = wake_after(interval);
    let mut outcome = WaitOutcome::Elapsed;
    if let Some(deadline) = deadline {
        if deadline <= wake {
            wake = deadline;
            outcome = WaitOutcome::DeadlineReached;
        }
    }

    match stop {
        Some(stop) => {
            tokio::select! {
                _ = sleep_until(wake) => outcome,
                _ = stop.stopped() => WaitOutcome::Stopped,
            }
        }
        None => {
            sleep_until(wake).await;
            outcome
        }
    }
}
