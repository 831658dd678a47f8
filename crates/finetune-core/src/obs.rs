//! Structured observability hooks for evaluation runs.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `EvaluationSpan` RAII guard
//! - Emission functions for lifecycle events: start, per-model score, skip,
//!   finish, failure and top-model selection
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filtering follows
//! `RUST_LOG`; see [`crate::telemetry::init_tracing`] for JSON output.

use tracing::{info, warn};

/// RAII guard that enters a run-scoped tracing span for the duration of an
/// evaluation.
///
/// # Example
///
/// ```ignore
/// let _span = EvaluationSpan::enter("2b0c...");
/// // every event below is tagged with run_id
/// ```
pub struct EvaluationSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvaluationSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("finetune.evaluate", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: evaluation started against a task batch.
pub fn emit_evaluation_started(run_id: &str, task_count: usize, task_digest: &str) {
    info!(
        event = "evaluation.started",
        run_id = %run_id,
        task_count = task_count,
        task_digest = %task_digest,
    );
}

/// Emit event: registry returned the candidate set.
pub fn emit_models_gathered(run_id: &str, model_count: usize) {
    info!(event = "evaluation.models_gathered", run_id = %run_id, model_count = model_count);
}

/// Emit event: one model scored.
pub fn emit_model_scored(run_id: &str, model: &str, score: f64) {
    info!(event = "evaluation.model_scored", run_id = %run_id, model = %model, score = score);
}

/// Emit event: model dropped under the skip policy (warning level).
pub fn emit_model_skipped(run_id: &str, model: &str, error: &dyn std::fmt::Display) {
    warn!(event = "evaluation.model_skipped", run_id = %run_id, model = %model, error = %error);
}

/// Emit event: evaluation committed a new snapshot.
pub fn emit_evaluation_finished(run_id: &str, duration_ms: u64, scored: usize, skipped: usize) {
    info!(
        event = "evaluation.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        scored = scored,
        skipped = skipped,
    );
}

/// Emit event: evaluation aborted, previous snapshot kept (warning level).
pub fn emit_evaluation_failed(run_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "evaluation.failed", run_id = %run_id, error = %error);
}

/// Emit event: top model selected.
pub fn emit_top_model_selected(model: &str, score: f64) {
    info!(event = "ranking.top_model", model = %model, score = score);
}
