//! LLM and embedding provider implementations for reqlens.
//!
//! All providers implement the `reqlens_core::Provider` trait.
//! The router builds one model handle per engine role from configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ModelSet, build_from_config};
