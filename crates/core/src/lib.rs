//! # reqlens Core
//!
//! Domain types, traits, and error definitions for the reqlens
//! requirement-alignment engine. This crate performs no I/O — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external capability (text generation, embeddings, the vector and
//! flat-record store) is a trait here. Implementations live in their
//! respective crates, so the engine can be driven by real HTTP backends in
//! production and by scripted stand-ins in tests.

pub mod error;
pub mod feedback;
pub mod message;
pub mod provider;
pub mod requirement;
pub mod store;
pub mod submission;
pub mod validation;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ErrorKind, NotFoundError, ProviderError, Result, StoreError, ValidationError};
pub use feedback::{CodeFeedback, FeedbackResult};
pub use message::{Message, Role};
pub use provider::{ModelHandle, Provider, ProviderRequest, ProviderResponse};
pub use requirement::{Category, ChunkPayload, Requirement, RequirementChunk};
pub use store::{FieldMap, Neighbor, VectorStore};
pub use submission::CodeSubmission;
