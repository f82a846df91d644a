//! Requirement repository.
//!
//! Stores a requirement as embedded chunks plus flat records, and rebuilds
//! it by exact key without touching the vector index.
//!
//! Record layout:
//! - `requirements:{id}:meta` with fields `id`, `chunkCount`, `category`
//! - `requirements:{id}:chunk:{index}` with fields `id`, `chunkIndex`,
//!   `content`, `category`
//!
//! Writes are sequential in chunk order and the summary record is written
//! last, so a reader never sees chunk `n + 1` before chunk `n`. A failure
//! partway leaves whatever was already written in place. A summary whose
//! chunk records are missing is reported as an invalid record.

use reqlens_core::error::{Error, Result, StoreError};
use reqlens_core::requirement::{Category, Requirement, RequirementChunk};
use reqlens_core::store::Neighbor;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapter::StoreAdapter;
use crate::chunker::Chunker;

/// Default minimum similarity for [`RequirementRepository::find_similar`].
pub const DEFAULT_SIMILARITY_FLOOR: f32 = 0.5;

pub struct RequirementRepository {
    adapter: StoreAdapter,
    chunker: Chunker,
    similarity_floor: f32,
}

pub fn meta_key(id: &str) -> String {
    format!("requirements:{id}:meta")
}

pub fn chunk_key(id: &str, index: usize) -> String {
    format!("requirements:{id}:chunk:{index}")
}

impl RequirementRepository {
    pub fn new(adapter: StoreAdapter, chunker: Chunker) -> Self {
        Self {
            adapter,
            chunker,
            similarity_floor: DEFAULT_SIMILARITY_FLOOR,
        }
    }

    pub fn with_similarity_floor(mut self, floor: f32) -> Self {
        self.similarity_floor = floor;
        self
    }

    pub fn adapter(&self) -> &StoreAdapter {
        &self.adapter
    }

    /// Store a requirement and return its id.
    ///
    /// An empty id is replaced by a random one. Storing the same content
    /// twice creates two requirements.
    pub async fn store(&self, requirement: &Requirement) -> Result<String> {
        let id = if requirement.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            requirement.id.trim().to_string()
        };
        let category = requirement.category.as_str();

        let chunks = self.chunker.chunk(&requirement.content);
        for (index, chunk_text) in chunks.iter().enumerate() {
            let chunk = RequirementChunk {
                requirement_id: id.clone(),
                chunk_index: index,
                category: requirement.category,
                chunk_text: chunk_text.clone(),
            };
            let vector = self.adapter.embed(&chunk.chunk_text).await?;
            self.adapter
                .upsert_vector(vector, chunk.payload().to_fields())
                .await?;

            let key = chunk_key(&id, index);
            for (field, value) in chunk.record_fields() {
                self.adapter.put_record(&key, field, &value).await?;
            }
            debug!(requirement_id = %id, index, "Stored chunk");
        }

        let key = meta_key(&id);
        self.adapter.put_record(&key, "id", &id).await?;
        self.adapter
            .put_record(&key, "chunkCount", &chunks.len().to_string())
            .await?;
        self.adapter.put_record(&key, "category", category).await?;

        info!(requirement_id = %id, chunks = chunks.len(), %category, "Stored requirement");
        Ok(id)
    }

    /// Rebuild a requirement from its flat records.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Requirement>> {
        let key = meta_key(id);
        let meta = self.adapter.get_all_fields(&key).await?;
        if meta.is_empty() {
            return Ok(None);
        }

        let chunk_count: usize = meta
            .get("chunkCount")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| invalid(&key, "chunkCount missing or not a number"))?;
        let category: Category = meta
            .get("category")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| invalid(&key, "category missing or unrecognized"))?;

        // The count comes from the store; trust the chunk records instead.
        let mut parts = Vec::new();
        for index in 0..chunk_count {
            let record_key = chunk_key(id, index);
            let fields = self.adapter.get_all_fields(&record_key).await?;
            let content = fields
                .get("content")
                .ok_or_else(|| invalid(&record_key, "chunk record missing"))?;
            parts.push(content.clone());
        }

        Ok(Some(Requirement::with_id(
            id,
            parts.join(" ").trim(),
            category,
        )))
    }

    /// Chunks most similar to `text`, best first, never below the floor.
    pub async fn find_similar(&self, text: &str, k: usize) -> Result<Vec<Neighbor>> {
        let vector = self.adapter.embed(text).await?;
        let hits = self
            .adapter
            .nearest_neighbors(&vector, k, self.similarity_floor)
            .await?;
        debug!(k, hits = hits.len(), floor = self.similarity_floor, "Similarity search");
        Ok(hits)
    }
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::StoreUnavailable(StoreError::InvalidRecord {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}
