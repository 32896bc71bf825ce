//! Pass/fail verdicts for evals and suite-level statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConditionalResult, EvalResult};
use crate::suite::Checks;

/// Composition mode of an eval's checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    And,
    Or,
}

impl From<&Checks> for CheckMode {
    fn from(checks: &Checks) -> Self {
        match checks {
            Checks::All(_) => CheckMode::And,
            Checks::Any { .. } => CheckMode::Or,
        }
    }
}

/// Overall verdict for one eval.
///
/// An empty list passes under AND (vacuous truth) and fails under OR.
pub fn aggregate_eval(results: &[ConditionalResult], mode: CheckMode) -> bool {
    match mode {
        CheckMode::And => results.iter().all(|r| r.passed),
        CheckMode::Or => results.iter().any(|r| r.passed),
    }
}

/// Display bucket for a suite's success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibeRating {
    Good,
    Sketchy,
    Bad,
}

impl VibeRating {
    /// Above 80% is good, 50% and up is sketchy, anything lower is bad.
    pub fn from_success_rate(rate: f64) -> Self {
        if rate > 80.0 {
            VibeRating::Good
        } else if rate >= 50.0 {
            VibeRating::Sketchy
        } else {
            VibeRating::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VibeRating::Good => "good",
            VibeRating::Sketchy => "sketchy",
            VibeRating::Bad => "bad",
        }
    }
}

impl fmt::Display for VibeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suite-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    /// Percentage of passing evals, 0 when there are none
    pub success_rate: f64,
    pub total_cost: f64,
    pub total_time_ms: u64,
}

impl SuiteSummary {
    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn rating(&self) -> VibeRating {
        VibeRating::from_success_rate(self.success_rate)
    }
}

pub fn aggregate_suite(results: &[EvalResult]) -> SuiteSummary {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let success_rate = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    };

    SuiteSummary {
        total,
        passed,
        success_rate,
        total_cost: results.iter().filter_map(|r| r.cost).sum(),
        total_time_ms: results.iter().filter_map(|r| r.execution_time_ms).sum(),
    }
}

/// Summary of the results produced by one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub summary: SuiteSummary,
}

/// Per-model summaries in first-seen model order.
///
/// Results without a model stamp are grouped under `default_model`.
pub fn summarize_by_model(results: &[EvalResult], default_model: &str) -> Vec<ModelSummary> {
    let mut order: Vec<String> = Vec::new();
    for result in results {
        let model = result.model.as_deref().unwrap_or(default_model);
        if !order.iter().any(|m| m == model) {
            order.push(model.to_string());
        }
    }

    order
        .into_iter()
        .map(|model| {
            let group: Vec<EvalResult> = results
                .iter()
                .filter(|r| r.model.as_deref().unwrap_or(default_model) == model)
                .cloned()
                .collect();
            ModelSummary {
                summary: aggregate_suite(&group),
                model,
            }
        })
        .collect()
}
