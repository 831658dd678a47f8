//! Score records, evaluation results and the per-run snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::ModelIdentity;

/// Scalar score of one model against the fixed task batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreRecord {
    /// Handle of the scored model.
    pub model: String,

    /// Quality score returned by the scorer.
    pub score: f64,
}

/// Externally visible `(score, tracking_info)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub score: f64,
    pub tracking_info: ModelIdentity,
}

/// A model dropped from a run under the skip failure policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedModel {
    pub tracking_info: ModelIdentity,
    pub reason: String,
}

/// Outcome of one `evaluate()` call.
///
/// # Invariants
///
/// `models` and `scores` are index-aligned and equal in length. A snapshot is
/// only ever built in full and swapped in; it is never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationSnapshot {
    pub run_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub task_digest: String,
    models: Vec<ModelIdentity>,
    scores: Vec<ScoreRecord>,
    skipped: Vec<SkippedModel>,
}

impl EvaluationSnapshot {
    /// Snapshot of a pipeline that has not evaluated yet.
    pub fn empty(task_digest: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::nil(),
            evaluated_at: DateTime::<Utc>::default(),
            task_digest: task_digest.into(),
            models: Vec::new(),
            scores: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn new(
        run_id: Uuid,
        task_digest: impl Into<String>,
        scored: Vec<(ModelIdentity, f64)>,
        skipped: Vec<SkippedModel>,
    ) -> Self {
        let (models, scores): (Vec<ModelIdentity>, Vec<ScoreRecord>) = scored
            .into_iter()
            .map(|(identity, score)| {
                let record = ScoreRecord {
                    model: identity.model.clone(),
                    score,
                };
                (identity, record)
            })
            .unzip();

        Self {
            run_id,
            evaluated_at: Utc::now(),
            task_digest: task_digest.into(),
            models,
            scores,
            skipped,
        }
    }

    pub fn models(&self) -> &[ModelIdentity] {
        &self.models
    }

    pub fn scores(&self) -> &[ScoreRecord] {
        &self.scores
    }

    pub fn skipped(&self) -> &[SkippedModel] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Zip scores with identities in registry order.
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.scores
            .iter()
            .zip(self.models.iter())
            .map(|(record, identity)| EvaluationResult {
                score: record.score,
                tracking_info: identity.clone(),
            })
            .collect()
    }
}
