//! Store adapter: embedding plus vector and record storage behind one type.
//!
//! Failures are classified here. A failing embed becomes
//! [`Error::EmbeddingUnavailable`], a failing store call
//! [`Error::StoreUnavailable`]. Nothing is retried.

use std::sync::Arc;

use reqlens_core::error::{Error, Result};
use reqlens_core::provider::ModelHandle;
use reqlens_core::store::{FieldMap, Neighbor, VectorStore};
use tracing::warn;

#[derive(Clone)]
pub struct StoreAdapter {
    embedder: ModelHandle,
    store: Arc<dyn VectorStore>,
}

impl StoreAdapter {
    pub fn new(embedder: ModelHandle, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed_one(text).await.map_err(|e| {
            warn!(model = %self.embedder.model(), error = %e, "Embedding failed");
            Error::EmbeddingUnavailable(e)
        })
    }

    pub async fn upsert_vector(&self, vector: Vec<f32>, payload: FieldMap) -> Result<String> {
        Ok(self.store.upsert_vector(vector, payload).await?)
    }

    pub async fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<Neighbor>> {
        Ok(self.store.nearest_neighbors(query, k, min_similarity).await?)
    }

    pub async fn put_record(&self, key: &str, field: &str, value: &str) -> Result<()> {
        Ok(self.store.put_record(key, field, value).await?)
    }

    pub async fn get_all_fields(&self, key: &str) -> Result<FieldMap> {
        Ok(self.store.get_all_fields(key).await?)
    }

    pub async fn vector_count(&self) -> Result<usize> {
        Ok(self.store.vector_count().await?)
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }
}
