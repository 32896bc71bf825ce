//! Command dispatch logic for vibe

mod macros;

use std::time::Instant;

use serde::Serialize;
use tokio::runtime::Runtime;

use crate::cli::{Cli, Commands};
use crate::commands;
use vibecheck_core::client::ApiClient;
use vibecheck_core::config::{ClientSettings, GlobalConfig};
use vibecheck_core::error::{Result, VibeError};

pub(crate) use macros::trace_command;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let Some(command) = &cli.command else {
        return Err(VibeError::UsageError(
            "no command given; run `vibe --help` for usage".to_string(),
        ));
    };

    match command {
        Commands::Validate { file } => commands::validate::execute(cli, file),

        Commands::Config { command } => commands::config::execute(cli, command),

        Commands::Check {
            file,
            models,
            interval_ms,
            timeout_secs,
        } => {
            let runtime = runtime()?;
            trace_command!(cli, start, "start_runtime");
            commands::check::execute(
                cli,
                &runtime,
                commands::check::CheckOptions {
                    file,
                    models,
                    interval_ms: *interval_ms,
                    timeout_secs: *timeout_secs,
                },
            )?;
            trace_command!(cli, start, "execute_command");
            Ok(())
        }

        Commands::Suite { command } => commands::suite::execute(cli, &runtime()?, command),

        Commands::Runs { command } => commands::runs::execute(cli, &runtime()?, command),

        Commands::Models => commands::account::models(cli, &runtime()?),

        Commands::Org => commands::account::org(cli, &runtime()?),

        Commands::Var { command } => commands::account::var(cli, &runtime()?, command),

        Commands::Secret { command } => commands::account::secret(cli, &runtime()?, command),
    }
}

/// Effective connection settings for this invocation.
pub(crate) fn settings(cli: &Cli) -> Result<ClientSettings> {
    let config = GlobalConfig::load()?;
    Ok(ClientSettings::resolve(
        cli.api_key.as_deref(),
        cli.api_url.as_deref(),
        &config,
    ))
}

pub(crate) fn connect(cli: &Cli) -> Result<ApiClient> {
    ApiClient::new(settings(cli)?)
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
