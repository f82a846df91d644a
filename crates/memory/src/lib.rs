//! Vector and record store implementations for reqlens.

pub mod in_memory;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use vector::{cosine_similarity, rank_neighbors};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
