//! Parsing of stage-two review output.
//!
//! The first `{` to the last `}` is decoded as JSON. If that fails, the raw
//! text is cut into sections at known headers and list items are pulled out
//! line by line. Parsing never fails; the worst case is a result holding
//! only the fallback score.

use std::sync::LazyLock;

use regex_lite::Regex;
use reqlens_core::feedback::{CodeFeedback, FeedbackResult};

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid ordinal pattern"));

const SCORE: &str = "Alignment Score";
const MISSES: &str = "Requirement Misses";
const EDGE_CASES: &str = "Edge Cases";
const CODE_FEEDBACK: &str = "Code Feedback";
const WARNINGS: &str = "Warnings";
const QUALITY: &str = "Quality:";
const OPTIMIZATIONS: &str = "Optimizations:";
const STANDARDS: &str = "Standards:";

const SECTIONS: [&str; 5] = [SCORE, MISSES, EDGE_CASES, CODE_FEEDBACK, WARNINGS];
const FEEDBACK_SECTIONS: [&str; 3] = [QUALITY, OPTIMIZATIONS, STANDARDS];

/// How a result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Structured,
    Heuristic,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedbackParser {
    fallback_score: f64,
}

impl FeedbackParser {
    pub fn new(fallback_score: f64) -> Self {
        Self { fallback_score }
    }

    pub fn parse(&self, text: &str) -> (FeedbackResult, ParseMode) {
        match self.parse_structured(text) {
            Some(result) => (result, ParseMode::Structured),
            None => (self.parse_heuristic(text), ParseMode::Heuristic),
        }
    }

    /// Decode the outermost brace span (or the whole text) as JSON.
    ///
    /// Only a wrong-typed score is repaired; other type mismatches fall
    /// through to the heuristic parse.
    pub fn parse_structured(&self, text: &str) -> Option<FeedbackResult> {
        let span = json_span(text).unwrap_or(text);
        let mut value: serde_json::Value = serde_json::from_str(span).ok()?;
        let object = value.as_object_mut()?;
        // A quoted number is accepted; any other non-number gets the fallback.
        let score = match object.get("alignmentScore") {
            Some(serde_json::Value::Number(_)) => None,
            Some(serde_json::Value::String(raw)) => Some(
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|score| score.is_finite())
                    .unwrap_or(self.fallback_score),
            ),
            _ => Some(self.fallback_score),
        };
        if let Some(score) = score {
            object.insert("alignmentScore".into(), score.into());
        }
        serde_json::from_value(value).ok()
    }

    /// Section-by-section extraction from free text.
    pub fn parse_heuristic(&self, text: &str) -> FeedbackResult {
        let alignment_score = section(text, SCORE, &SECTIONS)
            .and_then(parse_score)
            .unwrap_or(self.fallback_score);

        let code_feedback = section(text, CODE_FEEDBACK, &SECTIONS).and_then(|part| {
            let feedback = CodeFeedback {
                quality: section(part, QUALITY, &FEEDBACK_SECTIONS).and_then(non_empty),
                optimizations: section(part, OPTIMIZATIONS, &FEEDBACK_SECTIONS)
                    .map(extract_list_items),
                standards: section(part, STANDARDS, &FEEDBACK_SECTIONS).and_then(non_empty),
            };
            (!feedback.is_empty()).then_some(feedback)
        });

        FeedbackResult {
            alignment_score,
            requirement_misses: section(text, MISSES, &SECTIONS).map(extract_list_items),
            edge_cases: section(text, EDGE_CASES, &SECTIONS).map(extract_list_items),
            code_feedback,
            warnings: section(text, WARNINGS, &SECTIONS).map(extract_list_items),
        }
    }
}

impl Default for FeedbackParser {
    fn default() -> Self {
        Self::new(reqlens_core::feedback::NEUTRAL_SCORE)
    }
}

/// First `{` through last `}`.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Text after the first occurrence of `header`, up to the nearest
/// following occurrence of any header listed after it in `order`.
fn section<'a>(text: &'a str, header: &str, order: &[&str]) -> Option<&'a str> {
    let start = text.find(header)? + header.len();
    let rest = &text[start..];
    let later = order
        .iter()
        .skip_while(|h| **h != header)
        .skip(1);
    let end = later
        .filter_map(|h| rest.find(h))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Score from the first line of the section: keep digits and periods only.
fn parse_score(part: &str) -> Option<f64> {
    let line = part.split('\n').next().unwrap_or_default();
    let digits: String = line
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

fn non_empty(part: &str) -> Option<String> {
    let trimmed = part.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Bulleted (`-`, `*`) or numbered (`1.`) lines, plus bare lines without a
/// colon.
pub fn extract_list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(item) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
                Some(item.trim().to_string())
            } else if let Some(m) = ORDINAL.find(line) {
                Some(line[m.end()..].to_string())
            } else if !line.is_empty() && !line.contains(':') {
                Some(line.to_string())
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FeedbackParser {
        FeedbackParser::new(5.0)
    }

    #[test]
    fn structured_output_inside_prose() {
        let text = r#"Here is my review:
```json
{
  "alignmentScore": 8.5,
  "requirementMiss": ["no lockout"],
  "edgeCases": ["empty password"],
  "codeFeedback": {"quality": "clean", "optimizations": ["hash once"], "standards": "idiomatic"},
  "warnings": []
}
```
Hope this helps."#;
        let (result, mode) = parser().parse(text);
        assert_eq!(mode, ParseMode::Structured);
        assert_eq!(result.alignment_score, 8.5);
        assert_eq!(result.requirement_misses, Some(vec!["no lockout".to_string()]));
        assert_eq!(result.warnings, Some(vec![]));
        let feedback = result.code_feedback.unwrap();
        assert_eq!(feedback.standards.as_deref(), Some("idiomatic"));
    }

    #[test]
    fn structured_without_score_uses_fallback() {
        let (result, mode) = FeedbackParser::new(4.0).parse(r#"{"edgeCases": ["null"]}"#);
        assert_eq!(mode, ParseMode::Structured);
        assert_eq!(result.alignment_score, 4.0);
    }

    #[test]
    fn quoted_score_keeps_structured_lists() {
        let (result, mode) = parser().parse(
            r#"{"alignmentScore": "8", "requirementMisses": ["no lockout"], "edgeCases": ["empty"]}"#,
        );
        assert_eq!(mode, ParseMode::Structured);
        assert_eq!(result.alignment_score, 8.0);
        assert_eq!(result.requirement_misses, Some(vec!["no lockout".to_string()]));
        assert_eq!(result.edge_cases, Some(vec!["empty".to_string()]));
    }

    #[test]
    fn non_numeric_score_uses_fallback() {
        for raw in [r#""high""#, "true", "[7]", r#""NaN""#] {
            let text = format!(r#"{{"alignmentScore": {raw}, "warnings": ["slow"]}}"#);
            let (result, mode) = FeedbackParser::new(4.0).parse(&text);
            assert_eq!(mode, ParseMode::Structured, "{raw}");
            assert_eq!(result.alignment_score, 4.0, "{raw}");
            assert_eq!(result.warnings, Some(vec!["slow".to_string()]));
        }
    }

    #[test]
    fn heuristic_sections() {
        let text = "Alignment Score 7\nRequirement Misses\n- missed auth check\nEdge Cases\n- empty input\nCode Feedback\nQuality: decent\nOptimizations:\n- cache results\nStandards: ok\nWarnings\n- none";
        let (result, mode) = parser().parse(text);
        assert_eq!(mode, ParseMode::Heuristic);
        assert_eq!(result.alignment_score, 7.0);
        assert_eq!(result.requirement_misses, Some(vec!["missed auth check".to_string()]));
        assert_eq!(result.edge_cases, Some(vec!["empty input".to_string()]));
        let feedback = result.code_feedback.unwrap();
        assert_eq!(feedback.quality.as_deref(), Some("decent"));
        assert_eq!(feedback.optimizations, Some(vec!["cache results".to_string()]));
        assert_eq!(feedback.standards.as_deref(), Some("ok"));
        assert_eq!(result.warnings, Some(vec!["none".to_string()]));
    }

    #[test]
    fn malformed_json_degrades() {
        let (result, mode) = parser().parse(r#"{"alignmentScore": }"#);
        assert_eq!(mode, ParseMode::Heuristic);
        assert_eq!(result.alignment_score, 5.0);
        assert!(result.requirement_misses.is_none());
        assert!(result.code_feedback.is_none());
    }

    #[test]
    fn unparseable_score_defaults() {
        let result = parser().parse_heuristic("Alignment Score: high\nWarnings\n- slow");
        assert_eq!(result.alignment_score, 5.0);
        assert_eq!(result.warnings, Some(vec!["slow".to_string()]));
    }

    #[test]
    fn empty_text_is_bare_result() {
        let (result, _) = parser().parse("");
        assert_eq!(result, FeedbackResult::with_score(5.0));
    }

    #[test]
    fn list_item_forms() {
        let items = extract_list_items("\n- dash\n* star\n2. numbered\nbare words\nLabel: skipped\n\n");
        assert_eq!(items, vec!["dash", "star", "numbered", "bare words"]);
    }

    #[test]
    fn numbered_headers_still_split() {
        let text = "1. Alignment Score: 6.5\n2. Requirement Misses:\n- no audit log\n3. Edge Cases:\n- none found\n";
        let result = parser().parse_heuristic(text);
        assert_eq!(result.alignment_score, 6.5);
        assert_eq!(result.requirement_misses.unwrap()[0], "no audit log");
        assert_eq!(result.edge_cases, Some(vec!["none found".to_string()]));
    }
}
