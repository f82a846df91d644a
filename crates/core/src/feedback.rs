//! The structured verdict returned by an alignment check.
//!
//! Field names on the wire are camelCase. Only `alignmentScore` is always
//! present; everything else is omitted when the review did not produce it.

use serde::{Deserialize, Serialize};

/// Score used when the review gives none.
pub const NEUTRAL_SCORE: f64 = 5.0;

fn neutral_score() -> f64 {
    NEUTRAL_SCORE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResult {
    /// 0 to 10; 10 means the requirement is fully met.
    #[serde(default = "neutral_score")]
    pub alignment_score: f64,

    #[serde(default, alias = "requirementMiss", skip_serializing_if = "Option::is_none")]
    pub requirement_misses: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_cases: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_feedback: Option<CodeFeedback>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl FeedbackResult {
    /// A result carrying only a score.
    pub fn with_score(alignment_score: f64) -> Self {
        Self {
            alignment_score,
            requirement_misses: None,
            edge_cases: None,
            code_feedback: None,
            warnings: None,
        }
    }
}

impl Default for FeedbackResult {
    fn default() -> Self {
        Self::with_score(NEUTRAL_SCORE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizations: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standards: Option<String>,
}

impl CodeFeedback {
    pub fn is_empty(&self) -> bool {
        self.quality.is_none() && self.optimizations.is_none() && self.standards.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted() {
        let json = serde_json::to_value(FeedbackResult::with_score(8.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "alignmentScore": 8.0 }));
    }

    #[test]
    fn accepts_singular_miss_field() {
        let json = r#"{"alignmentScore": 6, "requirementMiss": ["no logging"]}"#;
        let result: FeedbackResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.requirement_misses, Some(vec!["no logging".to_string()]));
        assert_eq!(
            serde_json::to_value(&result).unwrap()["requirementMisses"][0],
            "no logging"
        );
    }

    #[test]
    fn missing_score_defaults_to_neutral() {
        let result: FeedbackResult = serde_json::from_str(r#"{"edgeCases": []}"#).unwrap();
        assert_eq!(result.alignment_score, NEUTRAL_SCORE);
        assert_eq!(result.edge_cases, Some(vec![]));
    }

    #[test]
    fn nested_code_feedback() {
        let json = r#"{"alignmentScore": 9, "codeFeedback": {"quality": "good", "optimizations": ["inline"]}}"#;
        let result: FeedbackResult = serde_json::from_str(json).unwrap();
        let feedback = result.code_feedback.unwrap();
        assert_eq!(feedback.quality.as_deref(), Some("good"));
        assert!(feedback.standards.is_none());
        assert!(!feedback.is_empty());
    }
}
