//! Wire types for the VibeCheck API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::results::EvalResult;

/// Server-side lifecycle state of a run.
///
/// `queued -> running -> completed | failed | partial_failure | timed_out | error`,
/// plus `cancelled`, which is only reachable from `queued`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunState {
    Queued,
    Running,
    Completed,
    Failed,
    PartialFailure,
    TimedOut,
    Error,
    Cancelled,
    /// A state this client does not know; treated as still in progress
    Unknown(String),
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::PartialFailure => "partial_failure",
            RunState::TimedOut => "timed_out",
            RunState::Error => "error",
            RunState::Cancelled => "cancelled",
            RunState::Unknown(state) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RunState::Queued | RunState::Running | RunState::Unknown(_)
        )
    }

    /// Only queued runs may be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, RunState::Queued)
    }
}

impl From<String> for RunState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => RunState::Queued,
            "running" => RunState::Running,
            "completed" => RunState::Completed,
            "failed" => RunState::Failed,
            "partial_failure" => RunState::PartialFailure,
            "timed_out" => RunState::TimedOut,
            "error" => RunState::Error,
            "cancelled" => RunState::Cancelled,
            _ => RunState::Unknown(value),
        }
    }
}

impl From<RunState> for String {
    fn from(state: RunState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /status/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub status: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<EvalResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunStatus {
    pub fn new(status: RunState) -> Self {
        Self {
            status,
            results: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitResponse {
    #[serde(default)]
    pub run_id: Option<String>,
}

/// A saved suite as listed by `GET /suite/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteInfo {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub eval_count: Option<usize>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A run as listed by `GET /runs` and `GET /runs/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub id: String,
    pub status: RunState,
    #[serde(default)]
    pub suite_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: Vec<EvalResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgInfo {
    pub name: String,
    #[serde(default)]
    pub credits_remaining: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    pub value: String,
}

/// Secrets are listed by name only; values never leave the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretInfo {
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuiteList {
    #[serde(default)]
    pub suites: Vec<SuiteInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunList {
    #[serde(default)]
    pub runs: Vec<RunInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VarList {
    #[serde(default)]
    pub vars: Vec<Var>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecretList {
    #[serde(default)]
    pub secrets: Vec<SecretInfo>,
}

/// A suite as returned by `GET /suite/:name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSuite {
    pub name: String,
    pub eval_suite: crate::suite::EvalSuite,
    #[serde(default)]
    pub yaml_content: Option<String>,
}
