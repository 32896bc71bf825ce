//! Account commands: models, org info, vars and secrets

use serde_json::json;
use tokio::runtime::Runtime;

use crate::cli::{Cli, OutputFormat, SecretCommands, VarCommands};
use crate::commands::dispatch::{connect, print_json};
use crate::commands::render::{CharWidth, Renderer};
use vibecheck_core::error::Result;

pub fn models(cli: &Cli, runtime: &Runtime) -> Result<()> {
    let models = runtime.block_on(connect(cli)?.list_models())?;

    match cli.format {
        OutputFormat::Json => print_json(&models),
        OutputFormat::Human => {
            let renderer = Renderer::new(&CharWidth)?;
            let width = renderer.column_width(models.iter().map(|m| m.id.as_str()));
            for model in &models {
                let label = model.name.as_deref().or(model.provider.as_deref()).unwrap_or("");
                println!("{}", format!("{}  {}", renderer.pad(&model.id, width), label).trim_end());
            }
            Ok(())
        }
    }
}

pub fn org(cli: &Cli, runtime: &Runtime) -> Result<()> {
    let info = runtime.block_on(connect(cli)?.org_info())?;

    match cli.format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Human => {
            println!("{}", info.name);
            if let Some(credits) = info.credits_remaining {
                println!("  credits: {:.2}", credits);
            }
            if let Some(status) = &info.status {
                println!("  status: {}", status);
            }
            Ok(())
        }
    }
}

pub fn var(cli: &Cli, runtime: &Runtime, command: &VarCommands) -> Result<()> {
    let client = connect(cli)?;

    match command {
        VarCommands::List => {
            let vars = runtime.block_on(client.list_vars())?;
            match cli.format {
                OutputFormat::Json => print_json(&vars),
                OutputFormat::Human => {
                    for var in &vars {
                        println!("{}={}", var.name, var.value);
                    }
                    Ok(())
                }
            }
        }
        VarCommands::Get { name } => {
            let var = runtime.block_on(client.get_var(name))?;
            match cli.format {
                OutputFormat::Json => print_json(&var),
                OutputFormat::Human => {
                    println!("{}", var.value);
                    Ok(())
                }
            }
        }
        VarCommands::Set { name, value } => {
            runtime.block_on(client.set_var(name, value))?;
            confirm(cli, "set", "var", name)
        }
        VarCommands::Delete { name } => {
            runtime.block_on(client.delete_var(name))?;
            confirm(cli, "deleted", "var", name)
        }
    }
}

/// Secret values are write-only; listing shows names and timestamps.
pub fn secret(cli: &Cli, runtime: &Runtime, command: &SecretCommands) -> Result<()> {
    let client = connect(cli)?;

    match command {
        SecretCommands::List => {
            let secrets = runtime.block_on(client.list_secrets())?;
            match cli.format {
                OutputFormat::Json => print_json(&secrets),
                OutputFormat::Human => {
                    for secret in &secrets {
                        match secret.updated_at {
                            Some(updated) => println!(
                                "{}  {}",
                                secret.name,
                                updated.format("%Y-%m-%d %H:%M")
                            ),
                            None => println!("{}", secret.name),
                        }
                    }
                    Ok(())
                }
            }
        }
        SecretCommands::Set { name, value } => {
            runtime.block_on(client.set_secret(name, value))?;
            confirm(cli, "set", "secret", name)
        }
        SecretCommands::Delete { name } => {
            runtime.block_on(client.delete_secret(name))?;
            confirm(cli, "deleted", "secret", name)
        }
    }
}

fn confirm(cli: &Cli, action: &str, kind: &str, name: &str) -> Result<()> {
    match cli.format {
        OutputFormat::Json => print_json(&json!({ "action": action, "kind": kind, "name": name })),
        OutputFormat::Human => {
            if !cli.quiet {
                println!("{} {} {}", capitalize(action), kind, name);
            }
            Ok(())
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
