//! The requirement-alignment engine.
//!
//! Requirements go in through [`AlignmentEngine::ingest`], which chunks and
//! embeds them. Code goes through [`AlignmentEngine::check`]:
//!
//! 1. **Resolve** the target requirement (explicit id, `UC-` marker, or
//!    nearest stored chunk)
//! 2. **Load** its text by exact key
//! 3. **Probe** the code's structure (logged only)
//! 4. **Analyze** with the coding model, then the review model
//!
//! The engine holds no state of its own between calls; everything shared
//! lives in the injected store.

pub mod adapter;
pub mod analyzer;
pub mod chunker;
pub mod repository;
pub mod resolver;
pub mod structure;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use reqlens_config::AppConfig;
use reqlens_core::error::{Error, NotFoundError, Result};
use reqlens_core::feedback::FeedbackResult;
use reqlens_core::provider::ModelHandle;
use reqlens_core::requirement::Requirement;
use reqlens_core::store::VectorStore;
use reqlens_core::submission::CodeSubmission;
use reqlens_memory::InMemoryStore;
use serde::Serialize;
use tracing::info;

pub use adapter::StoreAdapter;
pub use analyzer::{AlignmentAnalyzer, FeedbackParser, ParseMode};
pub use chunker::Chunker;
pub use repository::RequirementRepository;
pub use resolver::{RequirementResolver, Resolution, ResolutionTier};
pub use structure::{StructureProbe, StructureReport, probe_for};

/// Result of checking one submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub requirement_id: String,
    pub tier: ResolutionTier,
    pub feedback: FeedbackResult,
}

pub struct AlignmentEngine {
    repository: Arc<RequirementRepository>,
    resolver: RequirementResolver,
    analyzer: AlignmentAnalyzer,
    structure_probe: bool,
}

impl AlignmentEngine {
    pub fn new(
        repository: Arc<RequirementRepository>,
        resolver: RequirementResolver,
        analyzer: AlignmentAnalyzer,
    ) -> Self {
        Self {
            repository,
            resolver,
            analyzer,
            structure_probe: true,
        }
    }

    pub fn with_structure_probe(mut self, enabled: bool) -> Self {
        self.structure_probe = enabled;
        self
    }

    /// Wire an engine from explicit collaborators and config settings.
    pub fn assemble(
        config: &AppConfig,
        embedding: ModelHandle,
        coding: ModelHandle,
        review: ModelHandle,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let adapter = StoreAdapter::new(embedding, store);
        let chunker = Chunker::new(config.chunking.size, config.chunking.overlap);
        let repository = Arc::new(
            RequirementRepository::new(adapter, chunker)
                .with_similarity_floor(config.retrieval.similarity_floor),
        );
        let resolver =
            RequirementResolver::new(repository.clone()).with_top_k(config.retrieval.top_k);
        let analyzer = AlignmentAnalyzer::new(coding, review)
            .with_fallback_score(config.analysis.fallback_score);

        Self::new(repository, resolver, analyzer)
            .with_structure_probe(config.analysis.structure_probe)
    }

    /// Build providers and the store from configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let models = reqlens_providers::build_from_config(config);
        let store = open_store(config).await?;
        info!(
            store = store.name(),
            embedding = models.embedding.model(),
            coding = models.coding.model(),
            review = models.review.model(),
            "Engine configured"
        );
        Ok(Self::assemble(
            config,
            models.embedding,
            models.coding,
            models.review,
            store,
        ))
    }

    pub fn repository(&self) -> &Arc<RequirementRepository> {
        &self.repository
    }

    /// Store a requirement; returns its id.
    pub async fn ingest(&self, requirement: &Requirement) -> Result<String> {
        self.repository.store(requirement).await
    }

    /// A stored requirement by id.
    pub async fn requirement(&self, id: &str) -> Result<Requirement> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| NotFoundError::Requirement(id.to_string()).into())
    }

    /// Resolve, load, probe and analyze one submission.
    pub async fn check(&self, submission: &CodeSubmission) -> Result<CheckOutcome> {
        let resolution = self
            .resolver
            .resolve(submission)
            .await?
            .ok_or(Error::NotFound(NotFoundError::Unresolvable))?;

        let requirement = self.requirement(&resolution.requirement_id).await?;

        if self.structure_probe {
            structure::log_structure(&submission.language, &submission.code);
        }

        let feedback = self.analyzer.analyze(submission, &requirement).await?;
        Ok(CheckOutcome {
            requirement_id: resolution.requirement_id,
            tier: resolution.tier,
            feedback,
        })
    }
}

/// Open the configured store backend.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "sqlite" => {
            let store = reqlens_memory::SqliteStore::open(&config.store.path).await?;
            Ok(Arc::new(store))
        }
        other => Err(Error::Config {
            message: format!("Unknown store backend '{other}'"),
        }),
    }
}
