//! Finetune evaluation CLI
//!
//! The `finetune` command scores candidate models on a fixed task batch and
//! reports the winner.
//!
//! ## Commands
//!
//! - `evaluate`: run one evaluation over a model manifest and a task file
//! - `rank`: re-rank a previously written results artifact

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use finetune_core::{
    init_tracing, rank, read_results_json, render_leaderboard_md, top_model, write_results_json,
    CompletionScorer, CyclicTaskSource, EvalError, EvaluationResult, FailurePolicy,
    FinetunePipeline, ManifestRegistry, PipelineConfig, ResultsArtifact, ValidatorContext,
    METRICS,
};

#[derive(Parser)]
#[command(name = "finetune")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score finetuned models on a fixed task batch and pick a winner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation and print the leaderboard
    Evaluate {
        /// JSON array of candidate models
        #[arg(long)]
        manifest: PathBuf,

        /// JSONL file of task contexts
        #[arg(long)]
        tasks: PathBuf,

        /// Number of tasks in the fixed batch (overrides config file)
        #[arg(short = 'n', long, env = "FINETUNE_TASK_COUNT")]
        count: Option<usize>,

        /// TOML pipeline config
        #[arg(long, env = "FINETUNE_CONFIG")]
        config: Option<PathBuf>,

        /// Drop models whose scoring fails instead of aborting
        #[arg(long)]
        skip_failures: bool,

        /// Directory completion files are resolved against (default: manifest dir)
        #[arg(long)]
        completions_dir: Option<PathBuf>,

        /// Validator hotkey passed to collaborators
        #[arg(long, env = "FINETUNE_HOTKEY", default_value = "local")]
        hotkey: String,

        /// Subnet uid passed to collaborators
        #[arg(long, env = "FINETUNE_NETUID", default_value = "0")]
        netuid: u16,

        /// Write results.json here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a markdown leaderboard here
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Re-rank a results artifact and print the top model
    Rank {
        /// Path to results.json
        #[arg(long)]
        results: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Evaluate {
            manifest,
            tasks,
            count,
            config,
            skip_failures,
            completions_dir,
            hotkey,
            netuid,
            output,
            markdown,
        } => {
            let config = resolve_config(config.as_deref(), count, skip_failures)?;
            let completions_dir = completions_dir.unwrap_or_else(|| {
                manifest
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            cmd_evaluate(EvaluateArgs {
                manifest,
                tasks,
                config,
                completions_dir,
                context: ValidatorContext::new(hotkey, netuid),
                output,
                markdown,
            })
        }
        Commands::Rank { results } => cmd_rank(&results),
    }
}

/// File config first, then CLI overrides.
fn resolve_config(
    path: Option<&Path>,
    count: Option<usize>,
    skip_failures: bool,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(count) = count {
        config = config.with_task_count(count);
    }
    if skip_failures {
        config = config.with_failure_policy(FailurePolicy::Skip);
    }
    config.validate()?;
    Ok(config)
}

struct EvaluateArgs {
    manifest: PathBuf,
    tasks: PathBuf,
    config: PipelineConfig,
    completions_dir: PathBuf,
    context: ValidatorContext,
    output: Option<PathBuf>,
    markdown: Option<PathBuf>,
}

fn cmd_evaluate(args: EvaluateArgs) -> Result<()> {
    let mut source = CyclicTaskSource::from_jsonl(&args.tasks)
        .with_context(|| format!("load tasks {}", args.tasks.display()))?;
    info!(
        tasks = %args.tasks.display(),
        available = source.len(),
        task_count = args.config.task_count,
        "loaded task source"
    );

    let mut pipeline = FinetunePipeline::new(
        args.context,
        ManifestRegistry::new(&args.manifest),
        CompletionScorer::new().with_base_dir(&args.completions_dir),
        &mut source,
        args.config,
    )?;

    pipeline.evaluate().context("evaluation failed")?;
    METRICS.flush();

    let artifact = ResultsArtifact::from_snapshot(pipeline.snapshot(), pipeline.tasks().len());
    if let Some(path) = &args.output {
        write_results_json(path, &artifact)?;
        info!(path = %path.display(), "wrote results artifact");
    }
    if let Some(path) = &args.markdown {
        std::fs::write(path, render_leaderboard_md(&artifact))
            .with_context(|| format!("write {:?}", path))?;
        info!(path = %path.display(), "wrote leaderboard");
    }

    print_leaderboard(&pipeline.ranked());
    for skipped in pipeline.snapshot().skipped() {
        println!(
            "skipped {} (uid {}): {}",
            skipped.tracking_info.model, skipped.tracking_info.uid, skipped.reason
        );
    }

    let top = pipeline.top_model().map_err(empty_as_context)?;
    print_top(&top);
    Ok(())
}

fn cmd_rank(path: &Path) -> Result<()> {
    let artifact = read_results_json(path)?;
    info!(
        run_id = %artifact.run_id,
        results = artifact.results.len(),
        "loaded results artifact"
    );

    print_leaderboard(&rank(&artifact.results));
    let top = top_model(&artifact.results).map_err(empty_as_context)?;
    print_top(&top);
    Ok(())
}

fn empty_as_context(err: EvalError) -> anyhow::Error {
    if matches!(err, EvalError::EmptyResults) {
        anyhow::Error::new(err).context("no models were scored; nothing to select")
    } else {
        anyhow::Error::new(err)
    }
}

fn print_leaderboard(ranked: &[EvaluationResult]) {
    if ranked.is_empty() {
        println!("No scored models.");
        return;
    }
    println!("{:>4}  {:<40} {:>6} {:>10}", "RANK", "MODEL", "UID", "SCORE");
    for (i, r) in ranked.iter().enumerate() {
        println!(
            "{:>4}  {:<40} {:>6} {:>10.4}",
            i + 1,
            r.tracking_info.model,
            r.tracking_info.uid,
            r.score
        );
    }
}

fn print_top(top: &EvaluationResult) {
    println!(
        "top model: {} (uid {}, hotkey {}) score {:.4}",
        top.tracking_info.model, top.tracking_info.uid, top.tracking_info.hotkey, top.score
    );
    if let Ok(json) = serde_json::to_string(top) {
        println!("{}", json);
    }
}
