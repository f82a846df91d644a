//! Error types for the reqlens domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! keeps upstream failures apart by capability so an embedding outage is
//! never reported as a generation outage.

use thiserror::Error;

/// The top-level error type for all reqlens operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Caller-correctable input ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Unknown or unresolvable requirement ---
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    // --- Upstream capabilities ---
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(#[source] ProviderError),

    #[error("Generation service unavailable: {0}")]
    GenerationUnavailable(#[source] ProviderError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Coarse classification used by boundaries to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::EmbeddingUnavailable(_)
            | Error::GenerationUnavailable(_)
            | Error::StoreUnavailable(_) => ErrorKind::Upstream,
            Error::Config { .. } => ErrorKind::Internal,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid record at {key}: {reason}")]
    InvalidRecord { key: String, reason: String },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Requirement content cannot be empty")]
    EmptyContent,

    #[error("Category must be either 'Req' or 'Def', got '{0}'")]
    InvalidCategory(String),

    #[error("Code cannot be empty")]
    EmptyCode,

    #[error("Code exceeds maximum size limit of {max} characters (got {actual})")]
    CodeTooLarge { max: usize, actual: usize },

    #[error("Language must be specified")]
    MissingLanguage,

    #[error("Unsupported language: {language}. Supported languages: {}", .supported.join(", "))]
    UnsupportedLanguage {
        language: String,
        supported: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("Requirement not found: {0}")]
    Requirement(String),

    #[error(
        "Could not identify requirement for this implementation. \
         Please provide a requirementId or include a UC-{{id}} comment in your code."
    )]
    Unresolvable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::GenerationUnavailable(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
        assert!(err.to_string().starts_with("Generation"));
    }

    #[test]
    fn upstream_errors_classified_together() {
        let embed = Error::EmbeddingUnavailable(ProviderError::Network("refused".into()));
        let store = Error::StoreUnavailable(StoreError::Storage("disk full".into()));
        assert_eq!(embed.kind(), ErrorKind::Upstream);
        assert_eq!(store.kind(), ErrorKind::Upstream);
        assert!(embed.to_string().starts_with("Embedding"));
    }

    #[test]
    fn not_found_is_distinct_from_validation() {
        let missing: Error = NotFoundError::Requirement("42".into()).into();
        let invalid: Error = ValidationError::EmptyCode.into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(invalid.kind(), ErrorKind::Validation);
        assert!(missing.to_string().contains("42"));
    }

    #[test]
    fn config_error_is_internal() {
        let err = Error::Config { message: "bad port".into() };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("bad port"));
    }

    #[test]
    fn unresolvable_message_mentions_marker() {
        let err = NotFoundError::Unresolvable;
        assert!(err.to_string().contains("UC-{id}"));
    }

    #[test]
    fn unsupported_language_lists_allowed() {
        let err = ValidationError::UnsupportedLanguage {
            language: "cobol".into(),
            supported: vec!["rust".into(), "go".into()],
        };
        assert!(err.to_string().contains("cobol"));
        assert!(err.to_string().contains("rust, go"));
    }
}
