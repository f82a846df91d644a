//! Requirement resolver.
//!
//! Finds the requirement a code submission targets. Tiers run in order and
//! the first hit wins:
//! 1. the explicit `requirementId` hint, returned unchecked;
//! 2. the first `UC-<token>` marker in the code;
//! 3. the most similar stored chunk above the similarity floor.

use std::sync::{Arc, LazyLock};

use regex_lite::Regex;
use reqlens_core::error::Result;
use reqlens_core::requirement::ChunkPayload;
use reqlens_core::store::Neighbor;
use reqlens_core::submission::CodeSubmission;
use serde::Serialize;
use tracing::{debug, info};

use crate::repository::RequirementRepository;

static UC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"UC-([A-Za-z0-9_-]+):?").expect("valid UC token pattern"));

/// Which tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolutionTier {
    Explicit,
    EmbeddedToken,
    Semantic { similarity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub requirement_id: String,
    pub tier: ResolutionTier,
}

pub struct RequirementResolver {
    repository: Arc<RequirementRepository>,
    top_k: usize,
}

impl RequirementResolver {
    pub fn new(repository: Arc<RequirementRepository>) -> Self {
        Self {
            repository,
            top_k: 3,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Resolve the target requirement; `None` if no tier matched.
    pub async fn resolve(&self, submission: &CodeSubmission) -> Result<Option<Resolution>> {
        if let Some(id) = submission.explicit_requirement() {
            return Ok(Some(self.resolved(id.to_string(), ResolutionTier::Explicit)));
        }

        if let Some(token) = embedded_token(&submission.code) {
            return Ok(Some(self.resolved(token.to_string(), ResolutionTier::EmbeddedToken)));
        }

        let hits = self
            .repository
            .find_similar(&submission.code, self.top_k)
            .await?;
        let resolution = hits.first().and_then(|best| {
            let id = requirement_id_from(best)?;
            Some(self.resolved(
                id,
                ResolutionTier::Semantic {
                    similarity: best.similarity,
                },
            ))
        });

        if resolution.is_none() {
            debug!(candidates = hits.len(), "No requirement resolved");
        }
        Ok(resolution)
    }

    fn resolved(&self, requirement_id: String, tier: ResolutionTier) -> Resolution {
        info!(%requirement_id, ?tier, "Resolved requirement");
        Resolution {
            requirement_id,
            tier,
        }
    }
}

/// The token of the first `UC-` marker, e.g. `42` in `// UC-42: login`.
pub fn embedded_token(code: &str) -> Option<&str> {
    UC_TOKEN
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Requirement id from a hit: the structured payload field, or else an
/// `ID:` marker in the stored text.
fn requirement_id_from(hit: &Neighbor) -> Option<String> {
    if let Some(id) = hit
        .payload
        .get(ChunkPayload::REQUIREMENT_ID)
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
    {
        return Some(id.to_string());
    }

    let text = hit.payload.get(ChunkPayload::CHUNK_TEXT)?;
    id_marker(text)
}

fn id_marker(text: &str) -> Option<String> {
    let start = text.find("ID:")? + "ID:".len();
    text[start..]
        .split_whitespace()
        .next()
        .map(str::to_string)
}
