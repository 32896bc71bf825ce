//! Subcommands for the remote account surface and local config

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum SuiteCommands {
    /// Validate a suite file and save it to the server
    Save {
        /// Path to the suite YAML file
        file: PathBuf,
    },

    /// List saved suites
    List,

    /// Fetch a saved suite
    Get {
        /// Suite name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunsCommands {
    /// List recent runs
    List,

    /// Show a run and its results
    Get {
        /// Run ID
        id: String,
    },

    /// Cancel a queued run
    Cancel {
        /// Run ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum VarCommands {
    /// List variables
    List,

    /// Print a variable's value
    Get { name: String },

    /// Create or update a variable
    Set { name: String, value: String },

    /// Delete a variable
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum SecretCommands {
    /// List secret names
    List,

    /// Create or update a secret
    Set { name: String, value: String },

    /// Delete a secret
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Store an API key in the config file
    SetKey { key: String },

    /// Store the API base URL in the config file
    SetUrl { url: String },
}
