//! Structural validation of untyped suite documents.
//!
//! Validation walks the whole document and collects every issue before
//! giving up, so callers can report all problems in one pass.

use serde_json::{Map, Value};

use super::types::{EvalSuite, ValidationIssue};
use crate::check::CheckKind;

const LEGACY_CHECKS_MESSAGE: &str = "legacy keyed-object checks format is no longer supported; \
     write checks as an array (all must pass) or as `or: [...]` (at least one must pass)";

/// Validate a parsed suite document and convert it into a typed suite.
pub fn validate(doc: &Value) -> Result<EvalSuite, Vec<ValidationIssue>> {
    let mut validator = Validator::default();
    validator.document(doc);

    if !validator.issues.is_empty() {
        return Err(validator.issues);
    }

    serde_json::from_value(doc.clone()).map_err(|e| vec![ValidationIssue::new("", e.to_string())])
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    fn document(&mut self, doc: &Value) {
        let Some(root) = doc.as_object() else {
            self.push(
                "",
                format!(
                    "suite must be a mapping with `metadata` and `evals`, found {}",
                    describe(doc)
                ),
            );
            return;
        };

        match root.get("metadata") {
            None => self.push("metadata", "is required"),
            Some(Value::Object(metadata)) => self.metadata(metadata),
            Some(other) => self.push(
                "metadata",
                format!("must be a mapping, found {}", describe(other)),
            ),
        }

        match root.get("evals") {
            None => self.push("evals", "is required"),
            Some(Value::Array(evals)) => {
                for (i, eval) in evals.iter().enumerate() {
                    self.eval(&index("evals", i), eval);
                }
            }
            Some(other) => self.push(
                "evals",
                format!("must be a sequence, found {}", describe(other)),
            ),
        }
    }

    fn metadata(&mut self, metadata: &Map<String, Value>) {
        self.non_empty_string(metadata.get("name"), "metadata.name");
        self.non_empty_string(metadata.get("model"), "metadata.model");

        if let Some(value) = metadata.get("system_prompt") {
            if !value.is_string() {
                self.push(
                    "metadata.system_prompt",
                    format!("must be a string, found {}", describe(value)),
                );
            }
        }

        if let Some(value) = metadata.get("threads") {
            let valid = value
                .as_u64()
                .is_some_and(|n| n >= 1 && n <= u64::from(u32::MAX));
            if !valid {
                self.push("metadata.threads", "must be a positive integer");
            }
        }

        match metadata.get("mcp_server") {
            None => {}
            Some(Value::Object(server)) => {
                self.reject_unknown_keys(
                    server,
                    &["url", "name", "authorization_token"],
                    "metadata.mcp_server",
                );
                self.non_empty_string(server.get("url"), "metadata.mcp_server.url");
                self.non_empty_string(server.get("name"), "metadata.mcp_server.name");
                if let Some(token) = server.get("authorization_token") {
                    if !token.is_string() {
                        self.push(
                            "metadata.mcp_server.authorization_token",
                            "must be a string",
                        );
                    }
                }
            }
            Some(other) => self.push(
                "metadata.mcp_server",
                format!("must be a mapping, found {}", describe(other)),
            ),
        }
    }

    fn eval(&mut self, path: &str, eval: &Value) {
        let Some(eval) = eval.as_object() else {
            self.push(
                path,
                format!("eval must be a mapping, found {}", describe(eval)),
            );
            return;
        };

        self.non_empty_string(eval.get("prompt"), &child(path, "prompt"));
        self.checks(&child(path, "checks"), eval.get("checks"));
    }

    fn checks(&mut self, path: &str, checks: Option<&Value>) {
        match checks {
            None => self.push(path, "is required"),
            Some(Value::Array(items)) => {
                for (i, check) in items.iter().enumerate() {
                    self.check(&index(path, i), check);
                }
            }
            Some(Value::Object(map)) if map.len() == 1 && map.contains_key("or") => {
                let or_path = child(path, "or");
                match &map["or"] {
                    Value::Array(items) if items.is_empty() => {
                        self.push(or_path, "must contain at least one check")
                    }
                    Value::Array(items) => {
                        for (i, check) in items.iter().enumerate() {
                            self.check(&index(&or_path, i), check);
                        }
                    }
                    other => self.push(
                        or_path,
                        format!("must be a sequence of checks, found {}", describe(other)),
                    ),
                }
            }
            Some(Value::Object(_)) => self.push(path, LEGACY_CHECKS_MESSAGE),
            Some(other) => self.push(
                path,
                format!(
                    "must be a sequence of checks or an `or` group, found {}",
                    describe(other)
                ),
            ),
        }
    }

    fn check(&mut self, path: &str, check: &Value) {
        let Some(map) = check.as_object() else {
            self.push(
                path,
                format!(
                    "check must be a mapping with one of: {}",
                    CheckKind::check_tags().join(", ")
                ),
            );
            return;
        };

        if map.is_empty() {
            self.push(
                path,
                format!(
                    "check is empty; expected one of: {}",
                    CheckKind::check_tags().join(", ")
                ),
            );
            return;
        }

        if map.contains_key("or") {
            self.push(child(path, "or"), "`or` groups cannot be nested");
            return;
        }

        let mut known = Vec::new();
        for key in map.keys() {
            match CheckKind::from_tag(key).filter(|kind| *kind != CheckKind::Or) {
                Some(kind) => known.push(kind),
                None => self.push(
                    child(path, key),
                    format!(
                        "unknown check type `{}` (expected one of: {})",
                        key,
                        CheckKind::check_tags().join(", ")
                    ),
                ),
            }
        }

        if map.len() > 1 {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            self.push(
                path,
                format!(
                    "check must define exactly one type, found: {}",
                    keys.join(", ")
                ),
            );
            return;
        }

        if let Some(kind) = known.first() {
            let body = &map[kind.as_str()];
            self.check_body(&child(path, kind.as_str()), *kind, body);
        }
    }

    fn check_body(&mut self, path: &str, kind: CheckKind, body: &Value) {
        match kind {
            CheckKind::Match | CheckKind::NotMatch => {
                self.non_empty_string(Some(body), path);
            }
            CheckKind::MinTokens | CheckKind::MaxTokens => {
                if body.as_u64().is_none() {
                    self.push(
                        path,
                        format!("must be a non-negative integer, found {}", body),
                    );
                }
            }
            CheckKind::Semantic => self.semantic(path, body),
            CheckKind::LlmJudge => match body.as_object() {
                Some(judge) => {
                    self.reject_unknown_keys(judge, &["criteria"], path);
                    self.non_empty_string(judge.get("criteria"), &child(path, "criteria"));
                }
                None => self.push(
                    path,
                    format!("must be a mapping with `criteria`, found {}", describe(body)),
                ),
            },
            CheckKind::Or => {}
        }
    }

    fn semantic(&mut self, path: &str, body: &Value) {
        let Some(semantic) = body.as_object() else {
            self.push(
                path,
                format!(
                    "must be a mapping with `expected` and `threshold`, found {}",
                    describe(body)
                ),
            );
            return;
        };

        self.reject_unknown_keys(semantic, &["expected", "threshold"], path);
        self.non_empty_string(semantic.get("expected"), &child(path, "expected"));

        let threshold_path = child(path, "threshold");
        match semantic.get("threshold") {
            None => self.push(threshold_path, "is required"),
            Some(value) => match value.as_f64() {
                Some(t) if (0.0..=1.0).contains(&t) => {}
                Some(t) => self.push(
                    threshold_path,
                    format!("must be between 0 and 1, found {}", t),
                ),
                None => self.push(
                    threshold_path,
                    format!("must be a number, found {}", describe(value)),
                ),
            },
        }
    }

    fn non_empty_string(&mut self, value: Option<&Value>, path: &str) {
        match value {
            None => self.push(path, "is required"),
            Some(Value::String(s)) if s.trim().is_empty() => self.push(path, "must not be empty"),
            Some(Value::String(_)) => {}
            Some(other) => self.push(path, format!("must be a string, found {}", describe(other))),
        }
    }

    fn reject_unknown_keys(&mut self, map: &Map<String, Value>, allowed: &[&str], path: &str) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.push(
                    child(path, key),
                    format!(
                        "unknown property `{}` (allowed: {})",
                        key,
                        allowed.join(", ")
                    ),
                );
            }
        }
    }
}
