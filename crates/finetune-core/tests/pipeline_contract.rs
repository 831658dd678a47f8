//! Evaluation pipeline contract tests.
//!
//! Every model is judged on the same task batch, results stay aligned with
//! the registry's model list, ties go to the earlier model, and a failed
//! evaluation never leaves a partially updated result set behind.

use std::cell::Cell;

use finetune_core::fakes::{FnScorer, ScriptedRegistry, StaticRegistry};
use finetune_core::{
    EvalError, FailurePolicy, FinetunePipeline, ModelIdentity, ModelRegistry, PipelineConfig,
    RegistryError, ScoreError, Scorer, SimilarityModel, TaskContextSource, ValidatorContext,
};
use serde_json::json;

fn model(id: &str, uid: u16) -> ModelIdentity {
    ModelIdentity::new(id, format!("hotkey-{}", uid), uid, 1_000 + uid as u64)
}

fn ids(results: &[finetune_core::EvaluationResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.tracking_info.model.clone())
        .collect()
}

fn counting_source() -> impl TaskContextSource {
    let mut n = 0u64;
    move || {
        n += 1;
        json!({ "task_id": format!("BigCodeBench/{}", n), "canonical_solution": "pass" })
    }
}

fn pipeline<R: ModelRegistry, S: Scorer>(
    registry: R,
    scorer: S,
    config: PipelineConfig,
) -> FinetunePipeline<R, S> {
    let mut source = counting_source();
    FinetunePipeline::new(
        ValidatorContext::new("5Validator", 45),
        registry,
        scorer,
        &mut source,
        config,
    )
    .unwrap_or_else(|e| panic!("pipeline construction failed: {}", e))
}

// ---- end-to-end ----

#[test]
fn three_models_two_tasks_scored_by_id_length() {
    let registry = StaticRegistry::new(vec![model("a", 1), model("bbb", 2), model("cc", 3)]);
    let scorer = FnScorer::new(|m, _| Ok(m.id().len() as f64));
    let mut p = pipeline(registry, scorer, PipelineConfig::default().with_task_count(2));

    assert_eq!(p.tasks().len(), 2);

    let results = p.evaluate().expect("evaluate");
    assert_eq!(results.len(), 3);
    assert_eq!(ids(&results), vec!["a", "bbb", "cc"]);
    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![1.0, 3.0, 2.0]);

    // The derived view matches what evaluate() returned.
    assert_eq!(p.results(), results);
    assert_eq!(p.top_model().expect("top").tracking_info.model, "bbb");
}

#[test]
fn results_len_matches_models_gathered() {
    let registry = ScriptedRegistry::new()
        .then_models(vec![model("m1", 1), model("m2", 2), model("m3", 3), model("m4", 4)])
        .then_models(vec![model("m5", 5)]);
    let mut p = pipeline(
        registry,
        FnScorer::new(|_, _| Ok(0.5)),
        PipelineConfig::default(),
    );

    assert_eq!(p.evaluate().expect("first").len(), 4);
    assert_eq!(p.snapshot().models().len(), p.snapshot().scores().len());

    // Second run replaces the snapshot wholesale.
    let second = p.evaluate().expect("second");
    assert_eq!(ids(&second), vec!["m5"]);
    assert_eq!(p.snapshot().models().len(), 1);
    assert_eq!(p.snapshot().scores().len(), 1);
}

#[test]
fn score_records_align_with_models() {
    let registry = StaticRegistry::new(vec![model("x", 1), model("y", 2)]);
    let mut p = pipeline(
        registry,
        FnScorer::new(|m, _| Ok(m.uid as f64 * 10.0)),
        PipelineConfig::default(),
    );
    p.evaluate().expect("evaluate");

    for (record, identity) in p.snapshot().scores().iter().zip(p.snapshot().models()) {
        assert_eq!(record.model, identity.model);
        assert_eq!(record.score, identity.uid as f64 * 10.0);
    }
}

// ---- fairness ----

#[test]
fn every_model_sees_the_identical_task_batch() {
    let registry = StaticRegistry::new(vec![model("a", 1), model("b", 2), model("c", 3)]);
    let mut p = pipeline(
        registry,
        FnScorer::new(|_, _| Ok(1.0)),
        PipelineConfig::default().with_task_count(4),
    );
    p.evaluate().expect("first");
    p.evaluate().expect("second");

    let calls = p.scorer().calls();
    assert_eq!(calls.len(), 6);
    for call in &calls {
        assert_eq!(call.task_count, 4);
        assert_eq!(call.task_digest, p.tasks().digest());
        assert_eq!(call.similarity, p.similarity().name());
    }
    let order: Vec<&str> = calls.iter().map(|c| c.model.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c", "a", "b", "c"]);
    assert_eq!(p.snapshot().task_digest, p.tasks().digest());
}

#[test]
fn task_batch_drawn_once_at_construction() {
    let draws = Cell::new(0usize);
    let mut source = || {
        draws.set(draws.get() + 1);
        json!({ "draw": draws.get() })
    };
    let mut p = FinetunePipeline::new(
        ValidatorContext::default(),
        StaticRegistry::new(vec![model("a", 1)]),
        FnScorer::new(|_, _| Ok(1.0)),
        &mut source,
        PipelineConfig::default().with_task_count(3),
    )
    .unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(draws.get(), 3);

    let digest = p.tasks().digest().to_string();
    p.evaluate().expect("evaluate");
    p.evaluate().expect("evaluate");
    assert_eq!(draws.get(), 3);
    assert_eq!(p.tasks().digest(), digest);
}

#[test]
fn custom_similarity_model_reaches_scorer() {
    struct Exact;
    impl SimilarityModel for Exact {
        fn name(&self) -> &str {
            "exact"
        }
        fn similarity(&self, generated: &str, reference: &str) -> f64 {
            if generated == reference {
                1.0
            } else {
                0.0
            }
        }
    }

    let mut p = pipeline(
        StaticRegistry::new(vec![model("a", 1)]),
        FnScorer::new(|_, _| Ok(1.0)),
        PipelineConfig::default(),
    )
    .with_similarity(Exact);
    p.evaluate().expect("evaluate");
    assert_eq!(p.scorer().calls()[0].similarity, "exact");
}

// ---- idempotence ----

#[test]
fn repeated_evaluate_is_a_fresh_identical_run() {
    let registry = StaticRegistry::new(vec![model("a", 1), model("b", 2)]);
    let mut p = pipeline(
        registry,
        FnScorer::new(|m, tasks| Ok(m.uid as f64 + tasks.len() as f64)),
        PipelineConfig::default().with_task_count(2),
    );

    let first = p.evaluate().expect("first");
    let first_run = p.snapshot().run_id;
    let second = p.evaluate().expect("second");

    assert_eq!(first, second);
    assert_ne!(p.snapshot().run_id, first_run);
    assert_eq!(p.registry().calls(), 2);
    assert_eq!(p.scorer().calls().len(), 4);
}

// ---- tie-break ----

#[test]
fn tie_goes_to_model_listed_first() {
    let registry = StaticRegistry::new(vec![model("M1", 1), model("M2", 2), model("M3", 3)]);
    let scorer = FnScorer::new(|m, _| {
        Ok(match m.id() {
            "M1" => 5.0,
            _ => 9.0,
        })
    });
    let mut p = pipeline(registry, scorer, PipelineConfig::default());
    p.evaluate().expect("evaluate");

    let top = p.top_model().expect("top");
    assert_eq!(top.tracking_info.model, "M2");
    assert_eq!(top.score, 9.0);

    assert_eq!(ids(&p.ranked()), vec!["M2", "M3", "M1"]);
    // results stay in registry order
    assert_eq!(ids(&p.results()), vec!["M1", "M2", "M3"]);
}

// ---- empty input ----

#[test]
fn top_model_before_any_evaluation_is_empty_error() {
    let p = pipeline(
        StaticRegistry::new(vec![model("a", 1)]),
        FnScorer::new(|_, _| Ok(1.0)),
        PipelineConfig::default(),
    );
    assert!(p.results().is_empty());
    assert!(matches!(p.top_model(), Err(EvalError::EmptyResults)));
}

#[test]
fn empty_registry_yields_empty_results() {
    let mut p = pipeline(
        StaticRegistry::new(Vec::new()),
        FnScorer::new(|_, _| Ok(1.0)),
        PipelineConfig::default(),
    );
    let results = p.evaluate().expect("evaluate");
    assert!(results.is_empty());
    assert!(p.results().is_empty());
    assert!(p.scorer().calls().is_empty());

    let err = p.top_model().unwrap_err();
    assert!(matches!(err, EvalError::EmptyResults));
    assert!(err.to_string().contains("empty result set"));
}

#[test]
fn empty_registry_run_replaces_previous_results() {
    let registry = ScriptedRegistry::new()
        .then_models(vec![model("a", 1)])
        .then_models(Vec::new());
    let mut p = pipeline(registry, FnScorer::new(|_, _| Ok(1.0)), PipelineConfig::default());

    p.evaluate().expect("first");
    assert_eq!(p.results().len(), 1);
    p.evaluate().expect("second");
    assert!(p.results().is_empty());
    assert!(matches!(p.top_model(), Err(EvalError::EmptyResults)));
}

// ---- failure propagation ----

#[test]
fn scorer_failure_aborts_and_keeps_previous_results() {
    let armed = Cell::new(false);
    let registry = StaticRegistry::new(vec![model("m1", 1), model("m2", 2), model("m3", 3)]);
    let scorer = FnScorer::new(|m, _| {
        if armed.get() && m.id() == "m2" {
            Err(ScoreError::Failed("sandbox crashed".to_string()))
        } else if armed.get() {
            Ok(100.0)
        } else {
            Ok(m.uid as f64)
        }
    });
    let mut p = pipeline(registry, scorer, PipelineConfig::default());

    let before = p.evaluate().expect("first");
    let before_run = p.snapshot().run_id;

    armed.set(true);
    let err = p.evaluate().unwrap_err();
    match &err {
        EvalError::Scoring { model, source } => {
            assert_eq!(model, "m2");
            assert!(matches!(source, ScoreError::Failed(msg) if msg == "sandbox crashed"));
        }
        other => panic!("expected scoring error, got {:?}", other),
    }

    // Nothing from the failed run is visible.
    assert_eq!(p.results(), before);
    assert_eq!(p.snapshot().run_id, before_run);

    // m3 was never scored in the aborted run.
    let second_run: Vec<String> = p.scorer().calls()[3..]
        .iter()
        .map(|c| c.model.clone())
        .collect();
    assert_eq!(second_run, vec!["m1", "m2"]);
}

#[test]
fn registry_failure_propagates_unchanged_and_keeps_previous_results() {
    let registry = ScriptedRegistry::new()
        .then_models(vec![model("a", 1), model("b", 2)])
        .then_error(RegistryError::Unavailable("subtensor timeout".to_string()));
    let mut p = pipeline(
        registry,
        FnScorer::new(|m, _| Ok(m.uid as f64)),
        PipelineConfig::default(),
    );

    let before = p.evaluate().expect("first");
    let err = p.evaluate().unwrap_err();
    assert!(matches!(
        &err,
        EvalError::Registry(RegistryError::Unavailable(msg)) if msg == "subtensor timeout"
    ));
    assert_eq!(err.to_string(), "model registry unavailable: subtensor timeout");
    assert_eq!(p.results(), before);
    assert_eq!(p.scorer().calls().len(), 2);
}

#[test]
fn registry_failure_before_first_run_leaves_pipeline_empty() {
    let registry =
        ScriptedRegistry::new().then_error(RegistryError::Malformed("bad json".to_string()));
    let mut p = pipeline(registry, FnScorer::new(|_, _| Ok(1.0)), PipelineConfig::default());

    assert!(p.evaluate().is_err());
    assert!(p.results().is_empty());
    assert!(matches!(p.top_model(), Err(EvalError::EmptyResults)));
}

// ---- skip policy ----

#[test]
fn skip_policy_drops_failing_model_and_keeps_alignment() {
    let registry = StaticRegistry::new(vec![model("m1", 1), model("m2", 2), model("m3", 3)]);
    let scorer = FnScorer::new(|m, _| {
        if m.id() == "m2" {
            Err(ScoreError::MissingOutput("no completions".to_string()))
        } else {
            Ok(m.uid as f64)
        }
    });
    let mut p = pipeline(
        registry,
        scorer,
        PipelineConfig::default().with_failure_policy(FailurePolicy::Skip),
    );

    let results = p.evaluate().expect("evaluate");
    assert_eq!(ids(&results), vec!["m1", "m3"]);
    assert_eq!(p.snapshot().models().len(), p.snapshot().scores().len());

    let skipped = p.snapshot().skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].tracking_info.model, "m2");
    assert!(skipped[0].reason.contains("no completions"));

    assert_eq!(p.top_model().expect("top").tracking_info.model, "m3");
}

#[test]
fn skip_policy_with_every_model_failing_is_empty_not_error() {
    let registry = StaticRegistry::new(vec![model("m1", 1), model("m2", 2)]);
    let scorer = FnScorer::new(|_, _| Err(ScoreError::Failed("down".to_string())));
    let mut p = pipeline(
        registry,
        scorer,
        PipelineConfig::default().with_failure_policy(FailurePolicy::Skip),
    );

    assert!(p.evaluate().expect("evaluate").is_empty());
    assert_eq!(p.snapshot().skipped().len(), 2);
    assert!(matches!(p.top_model(), Err(EvalError::EmptyResults)));
}
