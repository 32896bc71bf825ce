//! Suite documents: loading, validation and the typed schema.
//!
//! A suite is a YAML document with `metadata` and an ordered list of
//! `evals`, each holding a prompt and its checks.
//!
//! # Example
//!
//! ```rust,no_run
//! use vibecheck_core::suite;
//!
//! let suite = suite::load("evals/math.yaml").unwrap();
//! println!("{} evals against {}", suite.evals.len(), suite.metadata.model);
//! ```

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::validate;

use std::path::Path;

use crate::error::{Result, VibeError};

/// Parse suite YAML and validate it into a typed suite.
///
/// Syntax errors surface as [`VibeError::Yaml`]; schema problems are
/// collected into a single [`VibeError::Validation`].
pub fn parse_yaml(text: &str) -> Result<EvalSuite> {
    let doc: serde_json::Value = serde_yaml::from_str(text)?;
    validate(&doc).map_err(|issues| VibeError::Validation { issues })
}

/// Load a suite from a YAML file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<EvalSuite> {
    load_with_source(path).map(|(suite, _)| suite)
}

/// Load a suite and keep its YAML text, which the server stores alongside it.
pub fn load_with_source<P: AsRef<Path>>(path: P) -> Result<(EvalSuite, String)> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        VibeError::Other(format!("failed to read suite {}: {}", path.display(), e))
    })?;
    let suite = parse_yaml(&content)?;
    Ok((suite, content))
}

/// Render a suite back into its YAML document form.
pub fn to_yaml(suite: &EvalSuite) -> Result<String> {
    Ok(serde_yaml::to_string(suite)?)
}
