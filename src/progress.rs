//! Progress reporting and cooperative cancellation for long-running phases.
//!
//! Monte Carlo testing commonly runs thousands of trials; callers (usually
//! a UI layer) observe completion through a [`MonteCarloProgress`] callback
//! and stop a run early through a [`CancelToken`]. Progress is emitted from
//! worker threads when the `parallel` feature is enabled, so
//! implementations must be `Send + Sync`.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for receiving progress updates during Monte Carlo testing.
///
/// May be called from parallel rayon threads. Implementations must be
/// thread-safe.
pub trait MonteCarloProgress: Send + Sync {
    /// Called once before the first trial. `total` is the requested trial count.
    fn on_start(&self, total: u32);
    /// Called after each completed trial with the running completion count.
    fn on_trial(&self, completed: u32);
}

/// No-op implementation for callers that do not track progress.
pub struct NoopProgress;

impl MonteCarloProgress for NoopProgress {
    fn on_start(&self, _total: u32) {}
    fn on_trial(&self, _completed: u32) {}
}

/// Atomic progress tracker that can be polled from another thread.
///
/// Tracks completed/total trial counts and estimates remaining wall-clock
/// time from the elapsed average per trial.
pub struct AtomicProgressTracker {
    pub completed: AtomicU32,
    pub total: AtomicU32,
    started: Mutex<Option<Instant>>,
}

impl Default for AtomicProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicProgressTracker {
    pub fn new() -> Self {
        Self {
            completed: AtomicU32::new(0),
            total: AtomicU32::new(0),
            started: Mutex::new(None),
        }
    }

    /// Fraction of trials completed, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 0.0;
        }
        self.completed.load(Ordering::SeqCst) as f64 / total as f64
    }

    /// Estimated time remaining, once at least one trial has completed.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        let completed = self.completed.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        if completed == 0 || total == 0 {
            return None;
        }
        let started = (*self.started.lock().unwrap())?;
        let elapsed = started.elapsed();
        let per_trial = elapsed / completed;
        Some(per_trial * total.saturating_sub(completed))
    }
}

impl MonteCarloProgress for AtomicProgressTracker {
    fn on_start(&self, total: u32) {
        *self.started.lock().unwrap() = Some(Instant::now());
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    fn on_trial(&self, completed: u32) {
        // Workers may report out of order; the tracker only moves forward.
        self.completed.fetch_max(completed, Ordering::SeqCst);
    }
}

/// Shared flag for requesting early termination between trials.
///
/// Cloning the token shares the flag: a UI thread keeps one clone and the
/// analysis run holds another. Cancellation is observed at trial
/// boundaries only; a trial already underway runs to completion and is
/// included in the reported counts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of the run holding this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
