//! `vibe runs` - inspect and cancel runs

use serde_json::json;
use tokio::runtime::Runtime;

use crate::cli::{Cli, OutputFormat, RunsCommands};
use crate::commands::dispatch::{connect, print_json};
use crate::commands::render::{CharWidth, Renderer};
use vibecheck_core::client::{RunBackend, RunInfo};
use vibecheck_core::error::Result;
use vibecheck_core::results::aggregate_suite;

pub fn execute(cli: &Cli, runtime: &Runtime, command: &RunsCommands) -> Result<()> {
    let client = connect(cli)?;

    match command {
        RunsCommands::List => {
            let runs = runtime.block_on(client.list_runs())?;
            match cli.format {
                OutputFormat::Json => print_json(&runs),
                OutputFormat::Human => list_human(cli, &runs),
            }
        }

        RunsCommands::Get { id } => {
            let run = runtime.block_on(client.get_run(id))?;
            match cli.format {
                OutputFormat::Json => print_json(&run),
                OutputFormat::Human => show_human(&run),
            }
        }

        RunsCommands::Cancel { id } => {
            runtime.block_on(client.cancel(id))?;
            match cli.format {
                OutputFormat::Json => print_json(&json!({ "cancelled": id })),
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!("Cancelled run {}", id);
                    }
                    Ok(())
                }
            }
        }
    }
}

fn list_human(cli: &Cli, runs: &[RunInfo]) -> Result<()> {
    if runs.is_empty() {
        if !cli.quiet {
            println!("No runs");
        }
        return Ok(());
    }

    let renderer = Renderer::new(&CharWidth)?;
    let id_width = renderer.column_width(runs.iter().map(|r| r.id.as_str()));
    let state_width = renderer.column_width(runs.iter().map(|r| r.status.as_str()));

    for run in runs {
        let mut line = format!(
            "{}  {}",
            renderer.pad(&run.id, id_width),
            renderer.pad(run.status.as_str(), state_width)
        );
        if let Some(name) = &run.suite_name {
            line.push_str(&format!("  {}", name));
        }
        if let Some(created) = run.created_at {
            line.push_str(&format!("  {}", created.format("%Y-%m-%d %H:%M")));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}

fn show_human(run: &RunInfo) -> Result<()> {
    println!("Run {}", run.id);
    println!("  status: {}", run.status);
    if let Some(name) = &run.suite_name {
        println!("  suite: {}", name);
    }
    if let Some(model) = &run.model {
        println!("  model: {}", model);
    }
    if let Some(created) = run.created_at {
        println!("  created: {}", created.to_rfc3339());
    }
    if let Some(error) = &run.error {
        println!("  error: {}", error);
    }

    if !run.results.is_empty() {
        let renderer = Renderer::new(&CharWidth)?;
        println!();
        print!("{}", renderer.results(&run.results));
        println!("{}", renderer.summary(&aggregate_suite(&run.results)));
    }
    Ok(())
}
