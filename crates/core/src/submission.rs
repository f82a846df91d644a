//! Code submitted for an alignment check.

use serde::{Deserialize, Serialize};

/// Source code plus its language and an optional requirement hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSubmission {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_id: Option<String>,
}

impl CodeSubmission {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            requirement_id: None,
        }
    }

    pub fn with_requirement(mut self, id: impl Into<String>) -> Self {
        self.requirement_id = Some(id.into());
        self
    }

    /// The explicit requirement hint, if present and not blank.
    pub fn explicit_requirement(&self) -> Option<&str> {
        self.requirement_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
