//! Error types and exit codes for vibecheck
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (including failed runs and failing evals)
//! - 2: Usage error (bad flags/args)
//! - 3: Validation/data error (malformed suite document)
//! - 4: Authentication error (missing or rejected API key)
//! - 5: Network error (service unreachable)
//! - 6: Timeout (client-side ceiling or server-reported)
//! - 7: Cancellation rejected
//! - 130: Interrupted or cancelled

mod macros;

use std::time::Duration;
use thiserror::Error;

use crate::client::RunState;
use crate::suite::ValidationIssue;

/// Exit codes for the `vibe` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Validation/data error (3)
    Data = 3,
    /// Authentication error (4)
    Auth = 4,
    /// Network error (5)
    Network = 5,
    /// Timeout (6)
    Timeout = 6,
    /// Run could not be cancelled (7)
    CancelRejected = 7,
    /// Interrupted by the user (130)
    Interrupted = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during vibecheck operations
#[derive(Error, Debug)]
pub enum VibeError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Validation errors (exit code 3)
    #[error("invalid suite: {} issue(s) found", issues.len())]
    Validation { issues: Vec<ValidationIssue> },

    // Authentication errors (exit code 4)
    #[error("no API key configured (set VIBECHECK_API_KEY or run `vibe config set-key`)")]
    MissingApiKey,

    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    // Network errors (exit code 5)
    #[error("service unreachable at {url}: {reason}")]
    Network { url: String, reason: String },

    // Remote failures (exit code 1)
    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("run {run_id} {state}: {message}")]
    RunFailed {
        run_id: String,
        state: RunState,
        message: String,
    },

    #[error("{passed}/{total} evals passed")]
    EvalsFailed { passed: usize, total: usize },

    // Timeouts (exit code 6)
    #[error("run {run_id} timed out on the server: {message}")]
    ServerTimedOut { run_id: String, message: String },

    #[error("gave up waiting for run {run_id} after {waited:?}")]
    PollTimeout { run_id: String, waited: Duration },

    // Cancellation (exit codes 7 and 130)
    #[error("run {run_id} cannot be cancelled: {message}")]
    CancellationRejected { run_id: String, message: String },

    #[error("interrupted while waiting for run {run_id}")]
    Interrupted { run_id: String },

    #[error("run {run_id} was cancelled")]
    RunCancelled { run_id: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl VibeError {
    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        VibeError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        VibeError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            VibeError::UsageError(_) | VibeError::InvalidValue { .. } => ExitCode::Usage,

            VibeError::Validation { .. } | VibeError::Yaml(_) => ExitCode::Data,

            VibeError::MissingApiKey | VibeError::Authentication { .. } => ExitCode::Auth,

            VibeError::Network { .. } => ExitCode::Network,

            VibeError::ServerTimedOut { .. } | VibeError::PollTimeout { .. } => ExitCode::Timeout,

            VibeError::CancellationRejected { .. } => ExitCode::CancelRejected,

            VibeError::Interrupted { .. } | VibeError::RunCancelled { .. } => {
                ExitCode::Interrupted
            }

            VibeError::Api { .. }
            | VibeError::NotFound { .. }
            | VibeError::RunFailed { .. }
            | VibeError::EvalsFailed { .. }
            | VibeError::Io(_)
            | VibeError::Json(_)
            | VibeError::Toml(_)
            | VibeError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            VibeError::UsageError(_) => "usage_error",
            VibeError::InvalidValue { .. } => "invalid_value",
            VibeError::Validation { .. } => "validation_error",
            VibeError::MissingApiKey => "missing_api_key",
            VibeError::Authentication { .. } => "authentication_error",
            VibeError::Network { .. } => "network_error",
            VibeError::Api { .. } => "api_error",
            VibeError::NotFound { .. } => "not_found",
            VibeError::RunFailed { .. } => "run_failed",
            VibeError::EvalsFailed { .. } => "evals_failed",
            VibeError::ServerTimedOut { .. } => "server_timed_out",
            VibeError::PollTimeout { .. } => "poll_timeout",
            VibeError::CancellationRejected { .. } => "cancellation_rejected",
            VibeError::Interrupted { .. } => "interrupted",
            VibeError::RunCancelled { .. } => "run_cancelled",
            VibeError::Io(_) => "io_error",
            VibeError::Yaml(_) => "yaml_error",
            VibeError::Json(_) => "json_error",
            VibeError::Toml(_) => "toml_error",
            VibeError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    /// Validation errors carry every collected issue.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        if let VibeError::Validation { issues } = self {
            error_obj["issues"] = serde_json::json!(issues
                .iter()
                .map(|issue| serde_json::json!({ "path": issue.path, "message": issue.message }))
                .collect::<Vec<_>>());
        }

        serde_json::json!({ "error": error_obj })
    }
}

/// Result type alias for vibecheck operations
pub type Result<T> = std::result::Result<T, VibeError>;
