//! SQLite store for vectors and flat records.
//!
//! Uses a single SQLite database file with two tables:
//! - `vectors` — embeddings as little-endian f32 blobs plus a JSON payload
//! - `records` — one row per (key, field), so writing a field never
//!   disturbs the record's other fields
//!
//! Similarity search is a full scan ranked in Rust.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use reqlens_core::error::StoreError;
use reqlens_core::store::{FieldMap, Neighbor, VectorStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::vector::{self, StoredVector};

/// A persistent SQLite-backed store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a store from a connection string.
    ///
    /// The database and all tables are created automatically.
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {url}");
        Ok(store)
    }

    /// Open a store at a file path, creating parent directories.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Storage(format!("Cannot create {}: {e}", parent.display())))?;
        }
        Self::new(&format!("sqlite://{}", path.display())).await
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vectors (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT UNIQUE NOT NULL,
                payload    TEXT NOT NULL,
                embedding  BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("vectors table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key    TEXT NOT NULL,
                field  TEXT NOT NULL,
                value  TEXT NOT NULL,
                PRIMARY KEY (key, field)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("records table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_vector(row: &sqlx::sqlite::SqliteRow) -> Result<StoredVector, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let payload_json: String = row
            .try_get("payload")
            .map_err(|e| StoreError::QueryFailed(format!("payload column: {e}")))?;
        let blob: Vec<u8> = row
            .try_get("embedding")
            .map_err(|e| StoreError::QueryFailed(format!("embedding column: {e}")))?;

        let payload: FieldMap =
            serde_json::from_str(&payload_json).map_err(|e| StoreError::InvalidRecord {
                key: id.clone(),
                reason: format!("payload: {e}"),
            })?;
        let vector = vector::decode_vector(&blob).ok_or_else(|| StoreError::InvalidRecord {
            key: id.clone(),
            reason: format!("embedding blob of {} bytes", blob.len()),
        })?;

        Ok(StoredVector {
            id,
            vector,
            payload,
        })
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn upsert_vector(&self, embedding: Vec<f32>, payload: FieldMap) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| StoreError::Storage(format!("Payload serialization: {e}")))?;
        let blob = vector::encode_vector(&embedding);

        sqlx::query(
            r#"
            INSERT INTO vectors (id, payload, embedding)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                embedding = excluded.embedding
            "#,
        )
        .bind(&id)
        .bind(&payload_json)
        .bind(&blob)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        debug!("Stored vector {id} ({} dims)", embedding.len());
        Ok(id)
    }

    async fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<Neighbor>, StoreError> {
        let rows = sqlx::query("SELECT id, payload, embedding FROM vectors ORDER BY iid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("SELECT vectors: {e}")))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::row_to_vector(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "Skipping unreadable vector row"),
            }
        }

        Ok(vector::rank_neighbors(&entries, query, k, min_similarity))
    }

    async fn put_record(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO records (key, field, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key, field) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("HSET {key} {field} failed: {e}")))?;

        Ok(())
    }

    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, StoreError> {
        let rows = sqlx::query("SELECT field, value FROM records WHERE key = ?1")
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("HGETALL {key}: {e}")))?;

        let mut fields = FieldMap::with_capacity(rows.len());
        for row in rows {
            let field: String = row
                .try_get("field")
                .map_err(|e| StoreError::QueryFailed(format!("field column: {e}")))?;
            let value: String = row
                .try_get("value")
                .map_err(|e| StoreError::QueryFailed(format!("value column: {e}")))?;
            fields.insert(field, value);
        }
        Ok(fields)
    }

    async fn vector_count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM vectors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| StoreError::QueryFailed(format!("health: {e}")))
    }
}
