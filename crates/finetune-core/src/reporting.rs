use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::domain::{EvaluationResult, EvaluationSnapshot, SkippedModel};
use crate::ranking;

pub const RESULTS_SCHEMA_VERSION: &str = "1";

/// Persisted results of one evaluation run, consumed by `finetune rank` and CI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub task_count: usize,
    pub task_digest: String,
    /// Registry order.
    pub results: Vec<EvaluationResult>,
    pub top_model: Option<EvaluationResult>,
    #[serde(default)]
    pub skipped: Vec<SkippedModel>,
}

impl ResultsArtifact {
    pub fn from_snapshot(snapshot: &EvaluationSnapshot, task_count: usize) -> Self {
        let results = snapshot.results();
        let top_model = ranking::top_model(&results).ok();
        Self {
            schema_version: RESULTS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: snapshot.run_id,
            task_count,
            task_digest: snapshot.task_digest.clone(),
            results,
            top_model,
            skipped: snapshot.skipped().to_vec(),
        }
    }
}

/// Write results.json in pretty JSON format.
pub fn write_results_json(path: &Path, artifact: &ResultsArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize results artifact")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Read a results.json written by [`write_results_json`].
pub fn read_results_json(path: &Path) -> Result<ResultsArtifact> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    let artifact: ResultsArtifact =
        serde_json::from_str(&content).with_context(|| format!("parse {:?}", path))?;
    Ok(artifact)
}

/// Render a markdown leaderboard for PR/comment output.
pub fn render_leaderboard_md(artifact: &ResultsArtifact) -> String {
    let mut out = String::new();
    out.push_str("# Finetune Leaderboard\n\n");
    let short_digest: String = artifact.task_digest.chars().take(12).collect();
    out.push_str(&format!(
        "- run: `{}`\n- tasks: {} (digest `{}`)\n- models scored: {}\n\n",
        artifact.run_id,
        artifact.task_count,
        short_digest,
        artifact.results.len(),
    ));

    match &artifact.top_model {
        Some(top) => out.push_str(&format!(
            "**Top model:** `{}` (uid {}) with score {:.4}\n\n",
            top.tracking_info.model, top.tracking_info.uid, top.score
        )),
        None => out.push_str("**Top model:** none (empty result set)\n\n"),
    }

    let ranked = ranking::rank(&artifact.results);
    if !ranked.is_empty() {
        out.push_str("| rank | model | uid | hotkey | score |\n");
        out.push_str("|---:|---|---:|---|---:|\n");
        for (i, r) in ranked.iter().enumerate() {
            out.push_str(&format!(
                "| {} | `{}` | {} | {} | {:.4} |\n",
                i + 1,
                r.tracking_info.model,
                r.tracking_info.uid,
                r.tracking_info.hotkey,
                r.score
            ));
        }
        out.push('\n');
    }

    if !artifact.skipped.is_empty() {
        out.push_str("## Skipped\n");
        for s in &artifact.skipped {
            out.push_str(&format!("- `{}`: {}\n", s.tracking_info.model, s.reason));
        }
    }

    out
}
