//! CLI argument parsing for vibe
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json,
//! --api-url, --api-key

pub mod output;
pub mod remote;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::OutputFormat;
pub use remote::{ConfigCommands, RunsCommands, SecretCommands, SuiteCommands, VarCommands};

/// VibeCheck - run LLM evaluation suites from the command line
#[derive(Parser, Debug)]
#[command(name = "vibe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directives (e.g. "debug", "vibecheck_core=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// API base URL (overrides VIBECHECK_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// API key (overrides VIBECHECK_API_KEY and the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a suite file and wait for its results
    Check {
        /// Path to the suite YAML file
        file: PathBuf,

        /// Model to run against; repeat to compare several models
        #[arg(long = "model", short = 'm', action = clap::ArgAction::Append)]
        models: Vec<String>,

        /// Delay between status polls in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Give up waiting after this many seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
    },

    /// Validate a suite file without running it
    Validate {
        /// Path to the suite YAML file
        file: PathBuf,
    },

    /// Manage saved suites
    Suite {
        #[command(subcommand)]
        command: SuiteCommands,
    },

    /// Inspect and cancel runs
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },

    /// List available models
    Models,

    /// Show organization info and remaining credits
    Org,

    /// Manage runtime variables
    Var {
        #[command(subcommand)]
        command: VarCommands,
    },

    /// Manage secrets
    Secret {
        #[command(subcommand)]
        command: SecretCommands,
    },

    /// Show or edit the local client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
