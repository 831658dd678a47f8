//! Domain models for finetune evaluation.
//!
//! Canonical definitions for the core entities:
//! - `Task` / `TaskBatch`: the fixed work every model is judged on
//! - `ModelIdentity`: a candidate model and its provenance
//! - `ScoreRecord` / `EvaluationResult`: per-model outcomes
//! - `EvaluationSnapshot`: the committed state of one evaluation run

pub mod error;
pub mod model;
pub mod result;
pub mod task;

// Re-export main types and errors
pub use error::{EvalError, RegistryError, Result, ScoreError};
pub use model::{ModelIdentity, ValidatorContext};
pub use result::{EvaluationResult, EvaluationSnapshot, ScoreRecord, SkippedModel};
pub use task::{Task, TaskBatch};
