//! Check kinds and per-kind interpretation of check results.
//!
//! Checks execute on the server; the client only needs to name them
//! correctly on the way out and explain their outcomes on the way back.

pub mod explain;

pub use explain::{explain, CheckDetail};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire tag of a check or check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Match,
    NotMatch,
    MinTokens,
    MaxTokens,
    Semantic,
    LlmJudge,
    /// OR-group wrapper; results of this kind carry children
    Or,
}

impl CheckKind {
    /// Kinds that may appear as a single check (everything but `or`).
    pub const CHECKS: [CheckKind; 6] = [
        CheckKind::Match,
        CheckKind::NotMatch,
        CheckKind::MinTokens,
        CheckKind::MaxTokens,
        CheckKind::Semantic,
        CheckKind::LlmJudge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Match => "match",
            CheckKind::NotMatch => "not_match",
            CheckKind::MinTokens => "min_tokens",
            CheckKind::MaxTokens => "max_tokens",
            CheckKind::Semantic => "semantic",
            CheckKind::LlmJudge => "llm_judge",
            CheckKind::Or => "or",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "match" => Some(CheckKind::Match),
            "not_match" => Some(CheckKind::NotMatch),
            "min_tokens" => Some(CheckKind::MinTokens),
            "max_tokens" => Some(CheckKind::MaxTokens),
            "semantic" => Some(CheckKind::Semantic),
            "llm_judge" => Some(CheckKind::LlmJudge),
            "or" => Some(CheckKind::Or),
            _ => None,
        }
    }

    pub fn check_tags() -> Vec<&'static str> {
        Self::CHECKS.iter().map(CheckKind::as_str).collect()
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
