//! `vibe config` - local client configuration

use serde_json::json;

use crate::cli::{Cli, ConfigCommands, OutputFormat};
use crate::commands::dispatch::{print_json, settings};
use vibecheck_core::bail_invalid;
use vibecheck_core::config::GlobalConfig;
use vibecheck_core::error::Result;

pub fn execute(cli: &Cli, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(cli),

        ConfigCommands::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                bail_invalid!("API key", "(empty)");
            }
            let mut config = GlobalConfig::load()?;
            config.api_key = Some(key.to_string());
            let path = config.save()?;
            saved(cli, "api_key", &path.display().to_string())
        }

        ConfigCommands::SetUrl { url } => {
            let url = url.trim().trim_end_matches('/');
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail_invalid!("API URL", url);
            }
            let mut config = GlobalConfig::load()?;
            config.api_url = Some(url.to_string());
            let path = config.save()?;
            saved(cli, "api_url", &path.display().to_string())
        }
    }
}

fn show(cli: &Cli) -> Result<()> {
    let path = GlobalConfig::config_path()?;
    let effective = settings(cli)?;
    let key = effective.api_key().map(mask);

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "path": path.display().to_string(),
            "api_url": effective.api_url(),
            "api_key": key,
        })),
        OutputFormat::Human => {
            println!("config: {}", path.display());
            println!("api_url: {}", effective.api_url());
            println!("api_key: {}", key.as_deref().unwrap_or("(not set)"));
            Ok(())
        }
    }
}

fn saved(cli: &Cli, field: &str, path: &str) -> Result<()> {
    match cli.format {
        OutputFormat::Json => print_json(&json!({ "saved": field, "path": path })),
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Saved {} to {}", field, path);
            }
            Ok(())
        }
    }
}

/// Keep only the last four characters of a key visible.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(8), tail)
}
