//! Per-kind interpretation of check result messages.
//!
//! The server formats messages differently per check kind, e.g.
//! `contains '4'`, `similarity: 0.82` or `12 tokens (min: 1, max: 50)`.
//! Renderers use [`CheckExplainer`] to pull structured detail back out.

use regex::Regex;

use super::CheckKind;
use crate::error::{Result, VibeError};
use crate::results::ConditionalResult;

/// Structured detail recovered from a check result.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckDetail {
    /// Quoted snippets from a `match`/`not_match` message, for highlighting
    Pattern { snippets: Vec<String> },
    /// Similarity score from a `semantic` message
    Similarity { score: Option<f64> },
    /// Token count from a `min_tokens`/`max_tokens` message
    Tokens { count: Option<u64> },
    /// Judge's free-text verdict
    Judgement { text: String },
    /// OR-group child tally
    Group { passed: usize, total: usize },
    /// Message of an unrecognized kind, passed through as-is
    Raw { text: String },
}

/// Compiled message parsers, constructed once and shared by a renderer.
#[derive(Debug, Clone)]
pub struct CheckExplainer {
    quoted: Regex,
    similarity: Regex,
    tokens: Regex,
    number: Regex,
}

impl CheckExplainer {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| VibeError::Other(format!("invalid pattern {}: {}", pattern, e)))
        };

        Ok(Self {
            quoted: compile(r#"'([^']*)'|"([^"]*)""#)?,
            similarity: compile(r"(?i)similarity\s*[:=]?\s*(\d+(?:\.\d+)?)")?,
            tokens: compile(r"(?i)(\d+)\s*tokens?")?,
            number: compile(r"\d+")?,
        })
    }

    /// Select the interpretation strategy by result kind.
    pub fn explain(&self, result: &ConditionalResult) -> CheckDetail {
        match result.kind() {
            Some(CheckKind::Match) | Some(CheckKind::NotMatch) => CheckDetail::Pattern {
                snippets: self.snippets(&result.message),
            },
            Some(CheckKind::Semantic) => CheckDetail::Similarity {
                score: self.similarity(&result.message),
            },
            Some(CheckKind::MinTokens) | Some(CheckKind::MaxTokens) => CheckDetail::Tokens {
                count: self.token_count(&result.message),
            },
            Some(CheckKind::LlmJudge) => CheckDetail::Judgement {
                text: result.message.clone(),
            },
            Some(CheckKind::Or) => CheckDetail::Group {
                passed: result.children.iter().filter(|c| c.passed).count(),
                total: result.children.len(),
            },
            None => CheckDetail::Raw {
                text: result.message.clone(),
            },
        }
    }

    fn snippets(&self, message: &str) -> Vec<String> {
        self.quoted
            .captures_iter(message)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn similarity(&self, message: &str) -> Option<f64> {
        self.similarity
            .captures(message)
            .and_then(|cap| cap[1].parse().ok())
    }

    fn token_count(&self, message: &str) -> Option<u64> {
        self.tokens
            .captures(message)
            .map(|cap| cap[1].to_string())
            .or_else(|| self.number.find(message).map(|m| m.as_str().to_string()))
            .and_then(|n| n.parse().ok())
    }
}

/// Convenience wrapper for one-off explanations.
pub fn explain(result: &ConditionalResult) -> Result<CheckDetail> {
    Ok(CheckExplainer::new()?.explain(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(kind: &str, passed: bool, message: &str) -> ConditionalResult {
        ConditionalResult {
            kind: kind.to_string(),
            passed,
            message: message.to_string(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_match_extracts_quoted_snippets() {
        let explainer = CheckExplainer::new().unwrap();
        let detail = explainer.explain(&result("match", true, "contains '4' and \"four\""));
        assert_eq!(
            detail,
            CheckDetail::Pattern {
                snippets: vec!["4".to_string(), "four".to_string()]
            }
        );
    }

    #[test]
    fn test_not_match_without_quotes_has_no_snippets() {
        let explainer = CheckExplainer::new().unwrap();
        let detail = explainer.explain(&result("not_match", true, "pattern absent"));
        assert_eq!(detail, CheckDetail::Pattern { snippets: vec![] });
    }

    #[test]
    fn test_semantic_parses_similarity() {
        let explainer = CheckExplainer::new().unwrap();
        let detail = explainer.explain(&result("semantic", false, "similarity: 0.82"));
        assert_eq!(detail, CheckDetail::Similarity { score: Some(0.82) });

        let missing = explainer.explain(&result("semantic", false, "embedding failed"));
        assert_eq!(missing, CheckDetail::Similarity { score: None });
    }

    #[test]
    fn test_token_count_prefers_tokens_suffix() {
        let explainer = CheckExplainer::new().unwrap();
        let detail = explainer.explain(&result("max_tokens", false, "57 tokens (min: 1, max: 50)"));
        assert_eq!(detail, CheckDetail::Tokens { count: Some(57) });

        let bare = explainer.explain(&result("min_tokens", true, "count=12"));
        assert_eq!(bare, CheckDetail::Tokens { count: Some(12) });
    }

    #[test]
    fn test_or_group_counts_children() {
        let explainer = CheckExplainer::new().unwrap();
        let mut group = result("or", true, "1 of 2 passed");
        group.children = vec![
            result("match", true, "contains 'a'"),
            result("not_match", false, "contains 'b'"),
        ];
        assert_eq!(
            explainer.explain(&group),
            CheckDetail::Group {
                passed: 1,
                total: 2
            }
        );
    }

    #[test]
    fn test_unknown_kind_passes_message_through() {
        let detail = explain(&result("regex", false, "no match")).unwrap();
        assert_eq!(
            detail,
            CheckDetail::Raw {
                text: "no match".to_string()
            }
        );
    }
}
