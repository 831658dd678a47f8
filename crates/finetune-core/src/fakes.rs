//! In-memory fakes for the collaborator traits (testing only).
//!
//! Provides `StaticRegistry`, `ScriptedRegistry` and `FnScorer`, which satisfy
//! the trait contracts without touching the network or the filesystem.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::domain::{ModelIdentity, RegistryError, ScoreError, TaskBatch, ValidatorContext};
use crate::registry::ModelRegistry;
use crate::scoring::{Scorer, SimilarityModel};

// ---------------------------------------------------------------------------
// StaticRegistry
// ---------------------------------------------------------------------------

/// Registry that returns the same model list on every call.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    models: Vec<ModelIdentity>,
    calls: Cell<usize>,
}

impl StaticRegistry {
    pub fn new(models: Vec<ModelIdentity>) -> Self {
        Self {
            models,
            calls: Cell::new(0),
        }
    }

    /// Number of `gather_all_models` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ModelRegistry for StaticRegistry {
    fn gather_all_models(
        &self,
        _context: &ValidatorContext,
    ) -> Result<Vec<ModelIdentity>, RegistryError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.models.clone())
    }
}

// ---------------------------------------------------------------------------
// ScriptedRegistry
// ---------------------------------------------------------------------------

/// Registry that plays back one scripted response per call.
///
/// Once the script runs out every call fails with `RegistryError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedRegistry {
    script: RefCell<VecDeque<Result<Vec<ModelIdentity>, RegistryError>>>,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_models(self, models: Vec<ModelIdentity>) -> Self {
        self.script.borrow_mut().push_back(Ok(models));
        self
    }

    pub fn then_error(self, error: RegistryError) -> Self {
        self.script.borrow_mut().push_back(Err(error));
        self
    }

    /// Responses not yet played back.
    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl ModelRegistry for ScriptedRegistry {
    fn gather_all_models(
        &self,
        _context: &ValidatorContext,
    ) -> Result<Vec<ModelIdentity>, RegistryError> {
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(RegistryError::Unavailable("script exhausted".to_string())))
    }
}

// ---------------------------------------------------------------------------
// FnScorer
// ---------------------------------------------------------------------------

/// What a scorer saw on one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerCall {
    pub model: String,
    pub task_count: usize,
    pub task_digest: String,
    pub similarity: String,
}

/// Scorer backed by a closure; records every call it receives.
pub struct FnScorer<F> {
    score_fn: F,
    calls: RefCell<Vec<ScorerCall>>,
}

impl<F> FnScorer<F>
where
    F: Fn(&ModelIdentity, &TaskBatch) -> Result<f64, ScoreError>,
{
    pub fn new(score_fn: F) -> Self {
        Self {
            score_fn,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<ScorerCall> {
        self.calls.borrow().clone()
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&ModelIdentity, &TaskBatch) -> Result<f64, ScoreError>,
{
    fn score(
        &self,
        _context: &ValidatorContext,
        model: &ModelIdentity,
        tasks: &TaskBatch,
        similarity: &dyn SimilarityModel,
    ) -> Result<f64, ScoreError> {
        self.calls.borrow_mut().push(ScorerCall {
            model: model.model.clone(),
            task_count: tasks.len(),
            task_digest: tasks.digest().to_string(),
            similarity: similarity.name().to_string(),
        });
        (self.score_fn)(model, tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_registry_plays_in_order_then_fails() {
        let registry = ScriptedRegistry::new()
            .then_models(vec![ModelIdentity::new("a", "hk", 1, 1)])
            .then_error(RegistryError::Unavailable("down".to_string()));
        let ctx = ValidatorContext::default();

        assert_eq!(registry.gather_all_models(&ctx).unwrap().len(), 1);
        assert!(registry.gather_all_models(&ctx).is_err());
        assert_eq!(registry.remaining(), 0);
        let err = registry.gather_all_models(&ctx).unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[test]
    fn test_static_registry_counts_calls() {
        let registry = StaticRegistry::new(Vec::new());
        let ctx = ValidatorContext::default();
        registry.gather_all_models(&ctx).unwrap();
        registry.gather_all_models(&ctx).unwrap();
        assert_eq!(registry.calls(), 2);
    }
}
