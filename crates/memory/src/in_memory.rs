//! In-memory store — useful for testing and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqlens_core::error::StoreError;
use reqlens_core::store::{FieldMap, Neighbor, VectorStore};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::vector::{StoredVector, rank_neighbors};

/// A store that keeps vectors in a Vec and records in a map.
/// Nothing survives the process.
pub struct InMemoryStore {
    vectors: Arc<RwLock<Vec<StoredVector>>>,
    records: Arc<RwLock<HashMap<String, FieldMap>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            vectors: Arc::new(RwLock::new(Vec::new())),
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn upsert_vector(&self, vector: Vec<f32>, payload: FieldMap) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.vectors.write().await.push(StoredVector {
            id: id.clone(),
            vector,
            payload,
        });
        Ok(id)
    }

    async fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<Neighbor>, StoreError> {
        let vectors = self.vectors.read().await;
        Ok(rank_neighbors(vectors.iter(), query, k, min_similarity))
    }

    async fn put_record(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, StoreError> {
        Ok(self.records.read().await.get(key).cloned().unwrap_or_default())
    }

    async fn vector_count(&self) -> Result<usize, StoreError> {
        Ok(self.vectors.read().await.len())
    }
}
