//! `vibe suite` - saved suites on the server

use serde_json::json;
use tokio::runtime::Runtime;

use crate::cli::{Cli, OutputFormat, SuiteCommands};
use crate::commands::dispatch::{connect, print_json};
use crate::commands::render::{CharWidth, Renderer};
use vibecheck_core::error::Result;
use vibecheck_core::suite;

pub fn execute(cli: &Cli, runtime: &Runtime, command: &SuiteCommands) -> Result<()> {
    let client = connect(cli)?;

    match command {
        SuiteCommands::Save { file } => {
            let (suite, yaml) = suite::load_with_source(file)?;
            runtime.block_on(client.save_suite(&suite, Some(&yaml)))?;
            match cli.format {
                OutputFormat::Json => print_json(&json!({ "saved": suite.metadata.name })),
                OutputFormat::Human => {
                    if !cli.quiet {
                        println!("Saved suite {}", suite.metadata.name);
                    }
                    Ok(())
                }
            }
        }

        SuiteCommands::List => {
            let suites = runtime.block_on(client.list_suites())?;
            match cli.format {
                OutputFormat::Json => print_json(&suites),
                OutputFormat::Human => {
                    if suites.is_empty() {
                        if !cli.quiet {
                            println!("No saved suites");
                        }
                        return Ok(());
                    }
                    let renderer = Renderer::new(&CharWidth)?;
                    let width = renderer.column_width(suites.iter().map(|s| s.name.as_str()));
                    for info in &suites {
                        let mut line = renderer.pad(&info.name, width);
                        if let Some(model) = &info.model {
                            line.push_str(&format!("  {}", model));
                        }
                        if let Some(count) = info.eval_count {
                            line.push_str(&format!("  {} evals", count));
                        }
                        if let Some(updated) = info.updated_at {
                            line.push_str(&format!("  {}", updated.format("%Y-%m-%d %H:%M")));
                        }
                        println!("{}", line.trim_end());
                    }
                    Ok(())
                }
            }
        }

        SuiteCommands::Get { name } => {
            let saved = runtime.block_on(client.get_suite(name))?;
            match cli.format {
                OutputFormat::Json => print_json(&saved),
                OutputFormat::Human => {
                    let yaml = match saved.yaml_content {
                        Some(yaml) => yaml,
                        None => suite::to_yaml(&saved.eval_suite)?,
                    };
                    print!("{}", yaml);
                    Ok(())
                }
            }
        }
    }
}
