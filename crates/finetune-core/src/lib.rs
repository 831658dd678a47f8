//! Finetune Core Library
//!
//! Scores candidate models against a fixed batch of code-generation tasks
//! and ranks them to select a winner.

pub mod config;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod ranking;
pub mod registry;
pub mod reporting;
pub mod scoring;
pub mod tasks;
pub mod telemetry;

pub use config::{FailurePolicy, PipelineConfig};

pub use domain::{
    EvalError, EvaluationResult, EvaluationSnapshot, ModelIdentity, RegistryError, Result,
    ScoreError, ScoreRecord, SkippedModel, Task, TaskBatch, ValidatorContext,
};

pub use pipeline::FinetunePipeline;
pub use ranking::{rank, top_model};
pub use registry::{ManifestRegistry, ModelRegistry};
pub use reporting::{
    read_results_json, render_leaderboard_md, write_results_json, ResultsArtifact,
    RESULTS_SCHEMA_VERSION,
};
pub use scoring::{CompletionScorer, Scorer, SimilarityModel, TokenJaccard};
pub use tasks::{generate_tasks, CyclicTaskSource, TaskContextSource};

pub use metrics::METRICS;
pub use obs::EvaluationSpan;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
