//! Ranking of evaluation results.
//!
//! Ordering is score descending with a stable sort: among equal scores the
//! model the registry returned first stays first. NaN scores sort after every
//! comparable score and keep registry order among themselves.

use std::cmp::Ordering;

use crate::domain::{EvalError, EvaluationResult, Result};

fn by_score_desc(a: &EvaluationResult, b: &EvaluationResult) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    }
}

/// Leaderboard in rank order. Input order breaks ties.
pub fn rank(results: &[EvaluationResult]) -> Vec<EvaluationResult> {
    let mut ranked = results.to_vec();
    // `sort_by` is stable; required for the tie-break.
    ranked.sort_by(by_score_desc);
    ranked
}

/// Highest-ranked result, or [`EvalError::EmptyResults`].
pub fn top_model(results: &[EvaluationResult]) -> Result<EvaluationResult> {
    let mut best: Option<&EvaluationResult> = None;
    for candidate in results {
        // Strictly-better only, so the earliest of tied maxima wins.
        if best.map_or(true, |b| by_score_desc(candidate, b) == Ordering::Less) {
            best = Some(candidate);
        }
    }
    best.cloned().ok_or(EvalError::EmptyResults)
}
