//! VectorStore trait — the combined vector index and flat record store.
//!
//! Two capabilities behind one seam:
//! - an index of embeddings, each carrying a string-to-string payload,
//!   searchable by cosine similarity;
//! - hash-style records keyed by string, where writing a field adds or
//!   replaces just that field.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreError;

/// String fields of a payload or record.
pub type FieldMap = HashMap<String, String>;

/// A similarity search hit.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub payload: FieldMap,
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name for logs (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Add a vector with its payload; returns the generated entry id.
    async fn upsert_vector(&self, vector: Vec<f32>, payload: FieldMap) -> Result<String, StoreError>;

    /// Up to `k` entries with similarity >= `min_similarity`, best first.
    async fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<Neighbor>, StoreError>;

    /// Set a single field on a record, creating the record if needed.
    async fn put_record(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// All fields of a record; empty if the record does not exist.
    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, StoreError>;

    /// Number of stored vectors.
    async fn vector_count(&self) -> Result<usize, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
