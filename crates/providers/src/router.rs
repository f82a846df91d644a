//! Provider router — builds the engine's three model handles from config.
//!
//! Each role (embedding, coding review, alignment review) names its own
//! provider and model, so they can point at different backends.

use std::sync::Arc;

use reqlens_config::{AppConfig, ModelConfig};
use reqlens_core::provider::{ModelHandle, Provider};

use crate::openai_compat::OpenAiCompatProvider;

/// The models the engine talks to.
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub embedding: ModelHandle,
    pub coding: ModelHandle,
    pub review: ModelHandle,
}

/// Build model handles from configuration.
pub fn build_from_config(config: &AppConfig) -> ModelSet {
    ModelSet {
        embedding: build_model(config, &config.embedding),
        coding: build_model(config, &config.coding),
        review: build_model(config, &config.review),
    }
}

fn build_model(config: &AppConfig, model: &ModelConfig) -> ModelHandle {
    let provider = build_provider(config, model);
    let mut handle = ModelHandle::new(provider, &model.model).with_temperature(model.temperature);
    if let Some(max_tokens) = model.max_tokens {
        handle = handle.with_max_tokens(max_tokens);
    }
    handle
}

fn build_provider(config: &AppConfig, model: &ModelConfig) -> Arc<dyn Provider> {
    let base_url = model
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&model.provider));

    if model.provider == "ollama" {
        return Arc::new(OpenAiCompatProvider::ollama(Some(&base_url)));
    }

    let api_key = config.api_key_for(model).unwrap_or_default();
    Arc::new(OpenAiCompatProvider::new(&model.provider, &base_url, api_key))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "ollama" => "http://localhost:11434/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
