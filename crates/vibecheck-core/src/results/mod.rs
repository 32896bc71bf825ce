//! Result records returned by the service and their aggregation.

pub mod aggregate;

pub use aggregate::{
    aggregate_eval, aggregate_suite, summarize_by_model, CheckMode, ModelSummary, SuiteSummary,
    VibeRating,
};

use serde::{Deserialize, Serialize};

use crate::check::CheckKind;

/// Outcome of one check against one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalResult {
    /// Wire tag of the check (`match`, `semantic`, `or`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub passed: bool,
    #[serde(default)]
    pub message: String,
    /// Nested results when the check was an OR-group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConditionalResult>,
}

impl ConditionalResult {
    /// Parsed kind; `None` for tags this client does not know.
    pub fn kind(&self) -> Option<CheckKind> {
        CheckKind::from_tag(&self.kind)
    }
}

/// Outcome of one eval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalResult {
    pub eval_name: String,
    pub prompt: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub check_results: Vec<ConditionalResult>,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Model that produced the response; stamped by the client on multi-model runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl EvalResult {
    pub fn failed_checks(&self) -> impl Iterator<Item = &ConditionalResult> {
        self.check_results.iter().filter(|c| !c.passed)
    }
}
