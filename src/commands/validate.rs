//! `vibe validate` - check a suite file without contacting the server

use std::path::Path;

use serde_json::json;

use crate::cli::{Cli, OutputFormat};
use crate::commands::dispatch::print_json;
use vibecheck_core::error::Result;
use vibecheck_core::suite;

/// Validation failures propagate as [`vibecheck_core::error::VibeError::Validation`],
/// which carries every issue found.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let suite = suite::load(file)?;

    match cli.format {
        OutputFormat::Json => print_json(&json!({
            "valid": true,
            "name": suite.metadata.name,
            "model": suite.metadata.model,
            "evals": suite.evals.len(),
        })),
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "{} is valid: {} evals against {}",
                    file.display(),
                    suite.evals.len(),
                    suite.metadata.model
                );
            }
            Ok(())
        }
    }
}
