//! Evaluation pipeline.
//!
//! Construction draws the task batch once; every later `evaluate()` scores the
//! registry's current models against that same batch. A run either commits a
//! complete [`EvaluationSnapshot`] or fails and leaves the previous one in
//! place.

use std::time::Instant;

use uuid::Uuid;

use crate::config::{FailurePolicy, PipelineConfig};
use crate::domain::{
    EvalError, EvaluationResult, EvaluationSnapshot, ModelIdentity, Result, SkippedModel,
    TaskBatch, ValidatorContext,
};
use crate::metrics::METRICS;
use crate::obs::{
    emit_evaluation_failed, emit_evaluation_finished, emit_evaluation_started,
    emit_model_scored, emit_model_skipped, emit_models_gathered, emit_top_model_selected,
    EvaluationSpan,
};
use crate::ranking;
use crate::registry::ModelRegistry;
use crate::scoring::{Scorer, SimilarityModel, TokenJaccard};
use crate::tasks::{generate_tasks, TaskContextSource};

/// Scores candidate models on a fixed task batch and ranks them.
pub struct FinetunePipeline<R, S> {
    context: ValidatorContext,
    registry: R,
    scorer: S,
    similarity: Box<dyn SimilarityModel>,
    config: PipelineConfig,
    tasks: TaskBatch,
    snapshot: EvaluationSnapshot,
}

impl<R, S> FinetunePipeline<R, S>
where
    R: ModelRegistry,
    S: Scorer,
{
    /// Build a pipeline and fix its task batch.
    ///
    /// Draws `config.task_count` contexts from `source`. The similarity model
    /// defaults to [`TokenJaccard`]; see [`Self::with_similarity`].
    pub fn new(
        context: ValidatorContext,
        registry: R,
        scorer: S,
        source: &mut dyn TaskContextSource,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let tasks = generate_tasks(source, config.task_count)?;
        let snapshot = EvaluationSnapshot::empty(tasks.digest());
        Ok(Self {
            context,
            registry,
            scorer,
            similarity: Box::new(TokenJaccard),
            config,
            tasks,
            snapshot,
        })
    }

    /// Replace the similarity model handed to the scorer.
    pub fn with_similarity(mut self, similarity: impl SimilarityModel + 'static) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    pub fn context(&self) -> &ValidatorContext {
        &self.context
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn similarity(&self) -> &dyn SimilarityModel {
        self.similarity.as_ref()
    }

    /// The batch every model is judged on.
    pub fn tasks(&self) -> &TaskBatch {
        &self.tasks
    }

    /// Last committed evaluation.
    pub fn snapshot(&self) -> &EvaluationSnapshot {
        &self.snapshot
    }

    /// Refresh the model set, score every model, and commit the new snapshot.
    ///
    /// Not cached: each call is a fresh run. On error the previous snapshot
    /// is kept untouched.
    pub fn evaluate(&mut self) -> Result<Vec<EvaluationResult>> {
        let run_id = Uuid::new_v4();
        let run_label = run_id.to_string();
        let _span = EvaluationSpan::enter(&run_label);
        let start = Instant::now();
        emit_evaluation_started(&run_label, self.tasks.len(), self.tasks.digest());

        match self.run(run_id, &run_label) {
            Ok(snapshot) => {
                emit_evaluation_finished(
                    &run_label,
                    start.elapsed().as_millis() as u64,
                    snapshot.models().len(),
                    snapshot.skipped().len(),
                );
                METRICS.inc_evaluations();
                self.snapshot = snapshot;
                Ok(self.results())
            }
            Err(e) => {
                emit_evaluation_failed(&run_label, &e);
                Err(e)
            }
        }
    }

    fn run(&self, run_id: Uuid, run_label: &str) -> Result<EvaluationSnapshot> {
        let models = self.registry.gather_all_models(&self.context)?;
        emit_models_gathered(run_label, models.len());

        let mut scored: Vec<(ModelIdentity, f64)> = Vec::with_capacity(models.len());
        let mut skipped = Vec::new();

        for model in models {
            match self
                .scorer
                .score(&self.context, &model, &self.tasks, self.similarity.as_ref())
            {
                Ok(score) => {
                    METRICS.inc_models_scored();
                    emit_model_scored(run_label, model.id(), score);
                    scored.push((model, score));
                }
                Err(source) => {
                    METRICS.inc_scoring_failures();
                    match self.config.failure_policy {
                        FailurePolicy::Abort => {
                            return Err(EvalError::Scoring {
                                model: model.model,
                                source,
                            });
                        }
                        FailurePolicy::Skip => {
                            emit_model_skipped(run_label, model.id(), &source);
                            skipped.push(SkippedModel {
                                tracking_info: model,
                                reason: source.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(EvaluationSnapshot::new(
            run_id,
            self.tasks.digest(),
            scored,
            skipped,
        ))
    }

    /// Current results in registry order.
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.snapshot.results()
    }

    /// Current results in rank order.
    pub fn ranked(&self) -> Vec<EvaluationResult> {
        ranking::rank(&self.snapshot.results())
    }

    /// Best-scoring model; ties go to the model the registry listed first.
    pub fn top_model(&self) -> Result<EvaluationResult> {
        let top = ranking::top_model(&self.snapshot.results())?;
        emit_top_model_selected(top.tracking_info.id(), top.score);
        Ok(top)
    }
}

impl<R, S> std::fmt::Display for FinetunePipeline<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scores: Vec<f64> = self.snapshot.scores().iter().map(|r| r.score).collect();
        let models: Vec<&str> = self.snapshot.models().iter().map(|m| m.model.as_str()).collect();
        write!(
            f,
            "FinetunePipeline(scores={:?}, models={:?})",
            scores, models
        )
    }
}
