//! A cancellable, single-shot countdown with per-second tick and completion callbacks.
//!
//! Every [`crate::session::Session`] holds at most one `Timer` at a time; replacing or clearing
//! it cancels the previous countdown's background task, so no stale tick can ever fire.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Fired once per second while the timer runs, carrying the integer-ceiling seconds remaining.
pub type TickCallback = Arc<dyn Fn(u64) + Send + Sync>;
/// Fired at most once, when the timer reaches zero without being paused or cleared first.
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

struct Running {
    handle: JoinHandle<()>,
    started_at: Instant,
    duration: Duration,
}

/// A countdown of whole seconds. Not `Clone`; owned exclusively by its `Session`.
pub struct Timer {
    duration_secs: u64,
    running: Option<Running>,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Timer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            running: None,
            on_tick: None,
            on_complete: None,
        }
    }

    pub fn with_tick(mut self, cb: TickCallback) -> Self {
        self.on_tick = Some(cb);
        self
    }

    pub fn with_complete(mut self, cb: CompleteCallback) -> Self {
        self.on_complete = Some(cb);
        self
    }

    /// Starts (or restarts) the countdown from `remaining_secs()`. An initial tick fires
    /// synchronously so callers observe the starting value without waiting a full second.
    pub fn start(&mut self) {
        self.abort();
        let duration = Duration::from_secs(self.duration_secs);
        let on_tick = self.on_tick.clone();
        let on_complete = self.on_complete.clone();
        let started_at = Instant::now();

        if let Some(cb) = &on_tick {
            cb(self.duration_secs);
        }

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await; // first tick fires immediately; already reported above
            loop {
                interval.tick().await;
                let elapsed = started_at.elapsed();
                if elapsed >= duration {
                    if let Some(cb) = &on_complete {
                        cb();
                    }
                    break;
                }
                let left = duration.as_secs().saturating_sub(elapsed.as_secs()).max(1);
                if let Some(cb) = &on_tick {
                    cb(left);
                }
            }
        });

        self.running = Some(Running {
            handle,
            started_at,
            duration,
        });
    }

    /// Stops future ticks, freezes `remaining_secs()` at its current integer-ceiling value, and
    /// suppresses the completion callback for the countdown that was running.
    pub fn pause(&mut self) {
        if let Some(running) = &self.running {
            let elapsed = running.started_at.elapsed();
            let left = running
                .duration
                .as_secs()
                .saturating_sub(elapsed.as_secs());
            self.duration_secs = left.max(0);
        }
        self.abort();
    }

    /// Restarts the countdown from the `remaining_secs()` left by the last `pause`.
    pub fn resume(&mut self) {
        self.start();
    }

    /// Cancels all future callbacks. Idempotent.
    pub fn clear(&mut self) {
        self.abort();
    }

    /// The ceiling of the seconds left, whether the timer is running, paused, or has completed
    /// naturally (in which case this returns 0 even though `running` hasn't been cleared yet).
    pub fn remaining_secs(&self) -> u64 {
        match &self.running {
            Some(running) => {
                let elapsed = running.started_at.elapsed();
                if elapsed >= running.duration {
                    0
                } else {
                    let left = running.duration - elapsed;
                    left.as_secs() + u64::from(left.subsec_nanos() > 0)
                }
            }
            None => self.duration_secs,
        }
    }

    fn abort(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn completion_fires_once_after_duration_elapses() {
        let completed = Arc::new(AtomicU64::new(0));
        let completed_clone = completed.clone();
        let mut timer = Timer::new(1).with_complete(Arc::new(move || {
            completed_clone.fetch_add(1, Ordering::SeqCst);
        }));
        timer.start();
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_suppresses_completion() {
        let completed = Arc::new(AtomicU64::new(0));
        let completed_clone = completed.clone();
        let mut timer = Timer::new(1).with_complete(Arc::new(move || {
            completed_clone.fetch_add(1, Ordering::SeqCst);
        }));
        timer.start();
        timer.clear();
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pause_then_resume_preserves_remaining_budget() {
        let mut timer = Timer::new(5);
        timer.start();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        timer.pause();
        let remaining_after_pause = timer.remaining_secs();
        assert!(remaining_after_pause <= 4);
        timer.resume();
        assert_eq!(timer.remaining_secs(), remaining_after_pause);
        timer.clear();
    }
}
