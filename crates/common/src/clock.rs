//! Clock and timing utilities for capture sessions.
//!
//! A capture session anchors its timing to a monotonic epoch taken when
//! recording starts. The user-facing elapsed counter is a separate 1 Hz
//! ticker so it keeps counting independently of recorder events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{LinkcardError, LinkcardResult};

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since recording start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Whole-second counter driven by a periodic Tokio task.
///
/// The task is aborted exactly once: by [`ElapsedTicker::cancel`] or, if
/// that never happened, when the ticker is dropped.
#[derive(Debug)]
pub struct ElapsedTicker {
    seconds: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTicker {
    /// Spawn the ticker on the current Tokio runtime.
    pub fn start() -> LinkcardResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| LinkcardError::capture("Elapsed ticker requires a Tokio runtime"))?;

        let seconds = Arc::new(AtomicU64::new(0));
        let counter = seconds.clone();
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        Ok(Self {
            seconds,
            handle: Some(handle),
        })
    }

    /// Seconds counted so far. Frozen once cancelled.
    pub fn seconds(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the ticker. Returns `true` only on the call that actually
    /// aborted the task.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!(seconds = self.seconds(), "Elapsed ticker cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = RecordingClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn ticker_requires_runtime() {
        let err = ElapsedTicker::start().unwrap_err();
        assert!(err.to_string().contains("Tokio runtime"));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_counts_whole_seconds() {
        let ticker = ElapsedTicker::start().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticker.seconds(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_cancels_exactly_once() {
        let mut ticker = ElapsedTicker::start().unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(ticker.cancel());
        assert!(!ticker.cancel());
        assert!(!ticker.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticker.seconds(), 2);
    }
}
