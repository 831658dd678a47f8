//! Scorer and similarity-model seams.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::domain::{ModelIdentity, ScoreError, Task, TaskBatch, ValidatorContext};

/// Metric comparing generated code with a reference solution.
///
/// Returns a value in 0.0–1.0 where 1.0 means equivalent.
pub trait SimilarityModel {
    fn name(&self) -> &str;

    fn similarity(&self, generated: &str, reference: &str) -> f64;
}

/// Jaccard similarity over whitespace-separated tokens.
///
/// A cheap baseline; production deployments plug in a learned metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl SimilarityModel for TokenJaccard {
    fn name(&self) -> &str {
        "token_jaccard"
    }

    fn similarity(&self, generated: &str, reference: &str) -> f64 {
        let a: HashSet<&str> = generated.split_whitespace().collect();
        let b: HashSet<&str> = reference.split_whitespace().collect();
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        let intersection = a.intersection(&b).count();
        let union = a.union(&b).count();
        intersection as f64 / union as f64
    }
}

/// Scores one model against the whole task batch.
///
/// From the pipeline's point of view this must be a pure function of its
/// inputs. It may block for as long as it needs.
pub trait Scorer {
    fn score(
        &self,
        context: &ValidatorContext,
        model: &ModelIdentity,
        tasks: &TaskBatch,
        similarity: &dyn SimilarityModel,
    ) -> std::result::Result<f64, ScoreError>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(
        &self,
        context: &ValidatorContext,
        model: &ModelIdentity,
        tasks: &TaskBatch,
        similarity: &dyn SimilarityModel,
    ) -> std::result::Result<f64, ScoreError> {
        (**self).score(context, model, tasks, similarity)
    }
}

/// Scores pre-generated completions.
///
/// `ModelIdentity::model` names a JSON file (relative to `base_dir`) mapping
/// task keys to generated code. The score is the mean similarity against each
/// task's `canonical_solution` (or `reference`). Tasks the model did not
/// answer score 0.0.
#[derive(Debug, Clone, Default)]
pub struct CompletionScorer {
    base_dir: Option<PathBuf>,
}

impl CompletionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Resolve the completions file for `model`.
    ///
    /// Handles come from the registry, so they must stay inside `base_dir`:
    /// absolute paths and `..` components are rejected.
    fn completions_path(
        &self,
        model: &ModelIdentity,
    ) -> std::result::Result<PathBuf, ScoreError> {
        let handle = Path::new(&model.model);
        let confined = handle
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if model.model.is_empty() || !confined {
            return Err(ScoreError::Failed(format!(
                "model handle {:?} must be a relative path without '..'",
                model.model
            )));
        }
        Ok(match &self.base_dir {
            Some(dir) => dir.join(handle),
            None => handle.to_path_buf(),
        })
    }

    fn load_completions(
        &self,
        model: &ModelIdentity,
    ) -> std::result::Result<BTreeMap<String, String>, ScoreError> {
        let path = self.completions_path(model)?;
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScoreError::MissingOutput(format!("no completions at {}", path.display()))
            } else {
                ScoreError::Io(e)
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ScoreError::Failed(format!("{}: {}", path.display(), e)))
    }
}

fn reference_solution(task: &Task) -> Option<&str> {
    task.context
        .get("canonical_solution")
        .or_else(|| task.context.get("reference"))
        .and_then(|v| v.as_str())
}

impl Scorer for CompletionScorer {
    fn score(
        &self,
        _context: &ValidatorContext,
        model: &ModelIdentity,
        tasks: &TaskBatch,
        similarity: &dyn SimilarityModel,
    ) -> std::result::Result<f64, ScoreError> {
        if tasks.is_empty() {
            return Ok(0.0);
        }

        let completions = self.load_completions(model)?;
        let mut total = 0.0;
        for task in tasks {
            let key = task.key();
            let reference = reference_solution(task).ok_or_else(|| {
                ScoreError::Failed(format!("task {} has no reference solution", key))
            })?;
            let task_score = match completions.get(&key) {
                Some(generated) => similarity.similarity(generated, reference),
                None => 0.0,
            };
            debug!(model = %model.model, task = %key, score = task_score, "task scored");
            total += task_score;
        }
        Ok(total / tasks.len() as f64)
    }
}
