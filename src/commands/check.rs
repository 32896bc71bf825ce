//! `vibe check` - run a suite and report how the responses held up
//!
//! - Validates the file locally before anything is sent
//! - One `--model` overrides the suite's model; several fan out concurrently
//! - Ctrl-C stops waiting and asks the server to cancel runs still in flight
//! - The first failing model ends a fan-out; its sibling runs are cancelled
//! - Exits non-zero when any eval failed

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tokio::runtime::Runtime;
use tracing::warn;

use crate::cli::{Cli, OutputFormat};
use crate::commands::dispatch::{connect, print_json};
use crate::commands::render::{CharWidth, Renderer};
use vibecheck_core::client::{
    PollOptions, RunBackend, RunLifecycle, Scheduler, TokioScheduler,
};
use vibecheck_core::error::{Result, VibeError};
use vibecheck_core::results::{aggregate_suite, summarize_by_model, EvalResult};
use vibecheck_core::suite::{self, EvalSuite};

pub struct CheckOptions<'a> {
    pub file: &'a Path,
    pub models: &'a [String],
    pub interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl CheckOptions<'_> {
    fn poll_options(&self) -> PollOptions {
        let defaults = PollOptions::default();
        PollOptions {
            interval: self
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            max_wait: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_wait),
        }
    }
}

pub fn execute(cli: &Cli, runtime: &Runtime, opts: CheckOptions<'_>) -> Result<()> {
    let (suite, yaml) = suite::load_with_source(opts.file)?;
    let client = connect(cli)?;
    if client.settings().api_key().is_none() {
        return Err(VibeError::MissingApiKey);
    }

    let lifecycle = RunLifecycle::new(client, TokioScheduler::new(), opts.poll_options());
    let token = lifecycle.cancel_token().clone();
    let _ = ctrlc::set_handler(move || {
        token.cancel();
    });

    if !cli.quiet && cli.format == OutputFormat::Human {
        eprintln!(
            "Running {} ({} evals)...",
            suite.metadata.name,
            suite.evals.len()
        );
    }

    let results = match runtime.block_on(run(&lifecycle, &suite, &yaml, opts.models)) {
        Ok(results) => results,
        // A failed fan-out abandons its sibling runs; don't leave them running.
        Err(err) if matches!(err, VibeError::Interrupted { .. }) || opts.models.len() > 1 => {
            cancel_in_flight(cli, runtime, &lifecycle);
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    report(cli, &suite, &results)
}

async fn run<B: RunBackend, S: Scheduler>(
    lifecycle: &RunLifecycle<B, S>,
    suite: &EvalSuite,
    yaml: &str,
    models: &[String],
) -> Result<Vec<EvalResult>> {
    match models {
        [] => Ok(lifecycle.run_suite(suite, Some(yaml)).await?.results),
        [model] => Ok(lifecycle
            .run_suite(&suite.with_model(model), None)
            .await?
            .results),
        _ => lifecycle.run_models(suite, models).await,
    }
}

fn cancel_in_flight<B: RunBackend, S: Scheduler>(
    cli: &Cli,
    runtime: &Runtime,
    lifecycle: &RunLifecycle<B, S>,
) {
    for run_id in lifecycle.in_flight() {
        match runtime.block_on(lifecycle.cancel(&run_id)) {
            Ok(()) => {
                if !cli.quiet {
                    eprintln!("Cancelled run {}", run_id);
                }
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "cancel_failed");
                if !cli.quiet {
                    eprintln!("warning: {}", e);
                }
            }
        }
    }
}

fn report(cli: &Cli, suite: &EvalSuite, results: &[EvalResult]) -> Result<()> {
    let summary = aggregate_suite(results);
    let by_model = summarize_by_model(results, &suite.metadata.model);

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "suite": suite.metadata.name,
            "results": results,
            "summary": summary,
            "rating": summary.rating(),
            "models": by_model,
        }))?,
        OutputFormat::Human => {
            let renderer = Renderer::new(&CharWidth)?;
            if !cli.quiet {
                print!("{}", renderer.results(results));
            }
            if by_model.len() > 1 {
                print!("{}", renderer.models(&by_model));
            }
            println!("{}", renderer.summary(&summary));
        }
    }

    if summary.all_passed() {
        Ok(())
    } else {
        Err(VibeError::EvalsFailed {
            passed: summary.passed,
            total: summary.total,
        })
    }
}
