//! Console rendering of eval results
//!
//! Column alignment and truncation go through a [`TextWidth`] measure so
//! callers decide how wide a string is on their terminal.

use vibecheck_core::check::explain::CheckExplainer;
use vibecheck_core::check::CheckDetail;
use vibecheck_core::error::Result;
use vibecheck_core::results::{ConditionalResult, EvalResult, ModelSummary, SuiteSummary};

/// Display width of a string in terminal columns.
pub trait TextWidth {
    fn width(&self, text: &str) -> usize;
}

/// One column per Unicode scalar value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharWidth;

impl TextWidth for CharWidth {
    fn width(&self, text: &str) -> usize {
        text.chars().count()
    }
}

const RESPONSE_PREVIEW_WIDTH: usize = 72;
const ELLIPSIS: &str = "...";

pub struct Renderer<'a> {
    measure: &'a dyn TextWidth,
    explainer: CheckExplainer,
}

impl<'a> Renderer<'a> {
    pub fn new(measure: &'a dyn TextWidth) -> Result<Self> {
        Ok(Self {
            measure,
            explainer: CheckExplainer::new()?,
        })
    }

    /// One line per eval; failing evals also get a response preview and
    /// their failing checks.
    pub fn results(&self, results: &[EvalResult]) -> String {
        let name_width = self.column_width(results.iter().map(|r| r.eval_name.as_str()));

        let mut out = String::new();
        for result in results {
            let mark = if result.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("{} {}", mark, self.pad(&result.eval_name, name_width)));
            if let Some(model) = &result.model {
                out.push_str(&format!("  [{}]", model));
            }
            if let Some(ms) = result.execution_time_ms {
                out.push_str(&format!("  {}ms", ms));
            }
            out.push('\n');

            if !result.passed {
                let preview = result.response.split_whitespace().collect::<Vec<_>>().join(" ");
                out.push_str(&format!(
                    "    response: {}\n",
                    self.truncate(&preview, RESPONSE_PREVIEW_WIDTH)
                ));
                for check in result.failed_checks() {
                    self.check(&mut out, check, 4);
                }
            }
        }
        out
    }

    fn check(&self, out: &mut String, check: &ConditionalResult, indent: usize) {
        let mark = if check.passed { "ok" } else { "x" };
        out.push_str(&format!(
            "{:indent$}{} {}: {}{}\n",
            "",
            mark,
            check.kind,
            check.message,
            self.detail(check),
            indent = indent
        ));
        for child in &check.children {
            self.check(out, child, indent + 2);
        }
    }

    fn detail(&self, check: &ConditionalResult) -> String {
        match self.explainer.explain(check) {
            CheckDetail::Pattern { snippets } if !snippets.is_empty() => {
                format!(" [pattern: {}]", snippets.join(", "))
            }
            CheckDetail::Similarity { score: Some(score) } => {
                format!(" [similarity {:.2}]", score)
            }
            CheckDetail::Tokens { count: Some(count) } => format!(" [{} tokens]", count),
            CheckDetail::Group { passed, total } => {
                format!(" [{}/{} alternatives passed]", passed, total)
            }
            _ => String::new(),
        }
    }

    pub fn summary(&self, summary: &SuiteSummary) -> String {
        let mut line = format!(
            "{}/{} evals passed ({:.1}%)  vibe: {}",
            summary.passed,
            summary.total,
            summary.success_rate,
            summary.rating()
        );
        if summary.total_cost > 0.0 {
            line.push_str(&format!("  cost: ${:.4}", summary.total_cost));
        }
        if summary.total_time_ms > 0 {
            line.push_str(&format!("  time: {}ms", summary.total_time_ms));
        }
        line
    }

    pub fn models(&self, models: &[ModelSummary]) -> String {
        let width = self.column_width(models.iter().map(|m| m.model.as_str()));

        models
            .iter()
            .map(|m| {
                format!(
                    "  {}  {}/{} ({:.1}%) {}\n",
                    self.pad(&m.model, width),
                    m.summary.passed,
                    m.summary.total,
                    m.summary.success_rate,
                    m.summary.rating()
                )
            })
            .collect()
    }

    /// Width of the widest entry.
    pub fn column_width<'t>(&self, texts: impl IntoIterator<Item = &'t str>) -> usize {
        texts
            .into_iter()
            .map(|t| self.measure.width(t))
            .max()
            .unwrap_or(0)
    }

    /// Left-align `text` in a column of `width`.
    pub fn pad(&self, text: &str, width: usize) -> String {
        let fill = width.saturating_sub(self.measure.width(text));
        format!("{}{}", text, " ".repeat(fill))
    }

    /// Cut `text` to at most `max` columns, ending in an ellipsis when cut.
    pub fn truncate(&self, text: &str, max: usize) -> String {
        if self.measure.width(text) <= max {
            return text.to_string();
        }

        let budget = max.saturating_sub(self.measure.width(ELLIPSIS));
        let mut used = 0;
        let mut out = String::new();
        for ch in text.chars() {
            let w = self.measure.width(ch.encode_utf8(&mut [0; 4]));
            if used + w > budget {
                break;
            }
            used += w;
            out.push(ch);
        }
        out.push_str(ELLIPSIS);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibecheck_core::results::aggregate_suite;

    /// Treats every non-ASCII character as two columns wide.
    struct WideWidth;

    impl TextWidth for WideWidth {
        fn width(&self, text: &str) -> usize {
            text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
        }
    }

    fn check(kind: &str, passed: bool, message: &str) -> ConditionalResult {
        ConditionalResult {
            kind: kind.to_string(),
            passed,
            message: message.to_string(),
            children: Vec::new(),
        }
    }

    fn eval(name: &str, passed: bool, checks: Vec<ConditionalResult>) -> EvalResult {
        EvalResult {
            eval_name: name.to_string(),
            prompt: "prompt".to_string(),
            response: "The answer\nis five".to_string(),
            check_results: checks,
            passed,
            execution_time_ms: None,
            cost: None,
            model: None,
        }
    }

    #[test]
    fn test_failing_eval_shows_explained_checks() {
        let renderer = Renderer::new(&CharWidth).unwrap();
        let results = vec![
            eval("arith", true, vec![check("match", true, "contains '4'")]),
            eval(
                "color",
                false,
                vec![
                    check("min_tokens", true, "3 tokens"),
                    check("semantic", false, "similarity: 0.42 below threshold 0.8"),
                ],
            ),
        ];

        let text = renderer.results(&results);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "PASS arith");
        assert_eq!(lines[1], "FAIL color");
        assert_eq!(lines[2], "    response: The answer is five");
        assert_eq!(
            lines[3],
            "    x semantic: similarity: 0.42 below threshold 0.8 [similarity 0.42]"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_or_group_lists_alternatives() {
        let renderer = Renderer::new(&CharWidth).unwrap();
        let mut group = check("or", false, "no alternative matched");
        group.children = vec![
            check("match", false, "missing 'red'"),
            check("match", false, "missing 'blue'"),
        ];

        let text = renderer.results(&[eval("color", false, vec![group])]);
        assert!(text.contains("x or: no alternative matched [0/2 alternatives passed]"));
        assert!(text.contains("      x match: missing 'red' [pattern: red]"));
    }

    #[test]
    fn test_injected_width_drives_alignment() {
        let narrow = Renderer::new(&CharWidth).unwrap();
        let wide = Renderer::new(&WideWidth).unwrap();

        assert_eq!(narrow.pad("日本", 4), "日本  ");
        assert_eq!(wide.pad("日本", 4), "日本");
        assert_eq!(wide.truncate("日本語のテキスト", 9), "日本語...");
    }

    #[test]
    fn test_truncate_leaves_short_text() {
        let renderer = Renderer::new(&CharWidth).unwrap();
        assert_eq!(renderer.truncate("short", 10), "short");
        assert_eq!(renderer.truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_summary_line() {
        let renderer = Renderer::new(&CharWidth).unwrap();
        let mut results = vec![
            eval("a", true, vec![]),
            eval("b", true, vec![]),
            eval("c", false, vec![]),
        ];
        results[0].cost = Some(0.0025);
        results[1].execution_time_ms = Some(120);

        let line = renderer.summary(&aggregate_suite(&results));
        assert_eq!(
            line,
            "2/3 evals passed (66.7%)  vibe: sketchy  cost: $0.0025  time: 120ms"
        );
    }
}
