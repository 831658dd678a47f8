//! Global atomic counters for evaluation observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. after an evaluation run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations and no locking.
pub struct Metrics {
    evaluations_run: AtomicU64,
    models_scored: AtomicU64,
    scoring_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            evaluations_run: AtomicU64::new(0),
            models_scored: AtomicU64::new(0),
            scoring_failures: AtomicU64::new(0),
        }
    }

    /// Increment the evaluations-run counter by one.
    pub fn inc_evaluations(&self) {
        self.evaluations_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "evaluations_run", "counter incremented");
    }

    /// Increment the models-scored counter by one.
    pub fn inc_models_scored(&self) {
        self.models_scored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "models_scored", "counter incremented");
    }

    /// Increment the scoring-failures counter by one.
    pub fn inc_scoring_failures(&self) {
        self.scoring_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "scoring_failures", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            evaluations_run = self.evaluations_run(),
            models_scored = self.models_scored(),
            scoring_failures = self.scoring_failures(),
        );
    }

    pub fn evaluations_run(&self) -> u64 {
        self.evaluations_run.load(Ordering::Relaxed)
    }

    pub fn models_scored(&self) -> u64 {
        self.models_scored.load(Ordering::Relaxed)
    }

    pub fn scoring_failures(&self) -> u64 {
        self.scoring_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.evaluations_run.store(0, Ordering::Relaxed);
        self.models_scored.store(0, Ordering::Relaxed);
        self.scoring_failures.store(0, Ordering::Relaxed);
    }
}
