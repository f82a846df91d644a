//! Alignment analyzer: two generation calls, then resilient parsing.
//!
//! Stage one asks the coding model for a free-text critique. Stage two
//! hands the requirement, the code and that critique to the review model
//! and asks for JSON. The calls are sequential and never retried.

pub mod parser;
pub mod prompt;

use reqlens_core::error::{Error, Result};
use reqlens_core::feedback::FeedbackResult;
use reqlens_core::provider::ModelHandle;
use reqlens_core::requirement::Requirement;
use reqlens_core::submission::CodeSubmission;
use tracing::{debug, info, warn};

pub use parser::{FeedbackParser, ParseMode};

pub struct AlignmentAnalyzer {
    coding: ModelHandle,
    review: ModelHandle,
    parser: FeedbackParser,
}

impl AlignmentAnalyzer {
    pub fn new(coding: ModelHandle, review: ModelHandle) -> Self {
        Self {
            coding,
            review,
            parser: FeedbackParser::default(),
        }
    }

    pub fn with_fallback_score(mut self, score: f64) -> Self {
        self.parser = FeedbackParser::new(score);
        self
    }

    pub async fn analyze(
        &self,
        submission: &CodeSubmission,
        requirement: &Requirement,
    ) -> Result<FeedbackResult> {
        let initial = self
            .coding
            .generate(&prompt::coding_prompt(&submission.language, &submission.code))
            .await
            .map_err(|e| {
                warn!(model = %self.coding.model(), error = %e, "Coding analysis failed");
                Error::GenerationUnavailable(e)
            })?;
        debug!(chars = initial.len(), "Stage one complete");

        let review_prompt = prompt::review_prompt(
            &requirement.content,
            &submission.code,
            &submission.language,
            &initial,
        );
        let review = self.review.generate(&review_prompt).await.map_err(|e| {
            warn!(model = %self.review.model(), error = %e, "Review generation failed");
            Error::GenerationUnavailable(e)
        })?;

        let (feedback, mode) = self.parser.parse(&review);
        debug!(?mode, "Parsed review output");
        info!(
            requirement_id = %requirement.id,
            score = feedback.alignment_score,
            "Analysis complete"
        );
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, SequentialMockProvider};
    use reqlens_core::requirement::Category;
    use std::sync::Arc;

    fn requirement() -> Requirement {
        Requirement::with_id("42", "Users can log in with email and password.", Category::Req)
    }

    fn submission() -> CodeSubmission {
        CodeSubmission::new("def login(email, pw):\n    return True", "python")
    }

    #[tokio::test]
    async fn stage_one_output_feeds_stage_two() {
        let coding = Arc::new(SequentialMockProvider::new(vec!["Always returns True."]));
        let review = Arc::new(SequentialMockProvider::new(vec![
            r#"{"alignmentScore": 2, "requirementMisses": ["password never checked"]}"#,
        ]));
        let analyzer = AlignmentAnalyzer::new(
            ModelHandle::new(coding.clone(), "coder"),
            ModelHandle::new(review.clone(), "reviewer"),
        );

        let result = analyzer.analyze(&submission(), &requirement()).await.unwrap();
        assert_eq!(result.alignment_score, 2.0);
        assert_eq!(
            result.requirement_misses,
            Some(vec!["password never checked".to_string()])
        );

        assert!(coding.prompts()[0].contains("python code"));
        let review_prompt = &review.prompts()[0];
        assert!(review_prompt.contains("Users can log in with email and password."));
        assert!(review_prompt.contains("INITIAL ANALYSIS: Always returns True."));
    }

    #[tokio::test]
    async fn prose_review_uses_heuristic_parse() {
        let coding = Arc::new(SequentialMockProvider::new(vec!["ok"]));
        let review = Arc::new(SequentialMockProvider::new(vec![
            "Alignment Score 7\nRequirement Misses\n- missed auth check\nWarnings\n- none",
        ]));
        let analyzer = AlignmentAnalyzer::new(
            ModelHandle::new(coding, "coder"),
            ModelHandle::new(review, "reviewer"),
        );

        let result = analyzer.analyze(&submission(), &requirement()).await.unwrap();
        assert_eq!(result.alignment_score, 7.0);
        assert_eq!(result.warnings, Some(vec!["none".to_string()]));
    }

    #[tokio::test]
    async fn malformed_json_still_returns_feedback() {
        let coding = Arc::new(SequentialMockProvider::new(vec!["ok"]));
        let review = Arc::new(SequentialMockProvider::new(vec![r#"{"alignmentScore": }"#]));
        let analyzer = AlignmentAnalyzer::new(
            ModelHandle::new(coding, "coder"),
            ModelHandle::new(review, "reviewer"),
        )
        .with_fallback_score(3.0);

        let result = analyzer.analyze(&submission(), &requirement()).await.unwrap();
        assert_eq!(result.alignment_score, 3.0);
    }

    #[tokio::test]
    async fn coding_failure_skips_review() {
        let review = Arc::new(SequentialMockProvider::new(vec![]));
        let analyzer = AlignmentAnalyzer::new(
            ModelHandle::new(Arc::new(FailingProvider), "coder"),
            ModelHandle::new(review.clone(), "reviewer"),
        );

        let err = analyzer.analyze(&submission(), &requirement()).await.unwrap_err();
        assert!(matches!(err, Error::GenerationUnavailable(_)));
        assert_eq!(review.call_count(), 0);
    }
}
