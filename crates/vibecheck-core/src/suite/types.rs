use serde::{Deserialize, Serialize};
use std::fmt;

use crate::check::CheckKind;

/// Root of a suite document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSuite {
    pub metadata: SuiteMetadata,
    pub evals: Vec<Eval>,
}

impl EvalSuite {
    /// Clone the suite with `model` substituted into `metadata.model`.
    pub fn with_model(&self, model: &str) -> Self {
        let mut suite = self.clone();
        suite.metadata.model = model.to_string();
        suite
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteMetadata {
    pub name: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<McpServer>,
}

/// Tool server made available to the model under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpServer {
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eval {
    pub prompt: String,
    pub checks: Checks,
}

/// How an eval's checks compose.
///
/// `All` serializes as a plain sequence, `Any` as `{or: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Checks {
    All(Vec<Check>),
    Any { or: Vec<Check> },
}

impl Checks {
    pub fn as_slice(&self) -> &[Check] {
        match self {
            Checks::All(checks) => checks,
            Checks::Any { or } => or,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// A single check. Exactly one variant per YAML mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Match(String),
    NotMatch(String),
    MinTokens(u64),
    MaxTokens(u64),
    Semantic(SemanticCheck),
    LlmJudge(LlmJudgeCheck),
}

impl Check {
    pub fn kind(&self) -> CheckKind {
        match self {
            Check::Match(_) => CheckKind::Match,
            Check::NotMatch(_) => CheckKind::NotMatch,
            Check::MinTokens(_) => CheckKind::MinTokens,
            Check::MaxTokens(_) => CheckKind::MaxTokens,
            Check::Semantic(_) => CheckKind::Semantic,
            Check::LlmJudge(_) => CheckKind::LlmJudge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticCheck {
    pub expected: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmJudgeCheck {
    pub criteria: String,
}

/// One problem found while validating a suite document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location in the document, e.g. `evals[0].checks[1].match`
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
