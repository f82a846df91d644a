//! Prompt templates for the two review stages.

/// Stage one: a free-text critique of the code on its own.
pub fn coding_prompt(language: &str, code: &str) -> String {
    format!(
        "Analyze this {language} code for quality, optimizations, and standards:\n\
         \n\
         {code}\n\
         \n\
         Provide a concise analysis focusing on code quality, potential optimizations, \
         and adherence to coding standards.\n"
    )
}

/// Stage two: judge the code against the requirement, answering in JSON.
pub fn review_prompt(requirement: &str, code: &str, language: &str, initial_analysis: &str) -> String {
    format!(
        r#"Comprehensive code review task:

REQUIREMENT: {requirement}

CODE:
{code}

LANGUAGE: {language}

INITIAL ANALYSIS: {initial_analysis}

Please provide a comprehensive review with the following structure:
1. Alignment Score (0-10): A numerical score indicating how well the code fulfills the requirement.
   Consider whether the requirement is Completely, Partially or not met.
   Penalize heavily if the requirement is completely missed.
2. Requirement Misses: List any aspects of the requirement that are not addressed.
   State whether the requirement is Completely, Partially or not met and highlight every deviation.
3. Edge Cases: List any edge cases that should be handled
4. Code Feedback:
   - Quality: Comments on code quality
   - Optimizations: Specific optimization suggestions
   - Standards: Adherence to coding standards
5. Warnings: Any other warnings or concerns

Please format your response as a JSON object with the following structure:
{{
  "alignmentScore": 8.5,
  "requirementMisses": ["item1", "item2"],
  "edgeCases": ["case1", "case2"],
  "codeFeedback": {{
    "quality": "comments on quality",
    "optimizations": ["opt1", "opt2"],
    "standards": "comments on standards"
  }},
  "warnings": ["warning1", "warning2"]
}}
"#
    )
}
