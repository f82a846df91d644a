//! Boundary validation for inbound requirements and code submissions.
//!
//! These run before any model or store is touched, so a rejected request
//! never costs an upstream call.

use crate::error::ValidationError;
use crate::requirement::Category;

/// Check requirement text and category.
pub fn validate_requirement(content: &str, raw_category: &str) -> Result<Category, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    raw_category.parse()
}

/// Check a code submission; returns the case-folded language.
pub fn validate_submission(
    code: &str,
    language: &str,
    max_code_size: usize,
    supported: &[String],
) -> Result<String, ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::EmptyCode);
    }
    let size = code.chars().count();
    if size > max_code_size {
        return Err(ValidationError::CodeTooLarge {
            max: max_code_size,
            actual: size,
        });
    }
    let language = language.trim().to_lowercase();
    if language.is_empty() {
        return Err(ValidationError::MissingLanguage);
    }
    if !supported.iter().any(|s| s.eq_ignore_ascii_case(&language)) {
        return Err(ValidationError::UnsupportedLanguage {
            language,
            supported: supported.to_vec(),
        });
    }
    Ok(language)
}
