//! Shared test helpers for engine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqlens_core::error::ProviderError;
use reqlens_core::message::Message;
use reqlens_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};

/// A mock provider that returns a sequence of scripted text responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the prompt it was sent.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(String::from).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let count = prompts.len();
        if count >= self.responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                self.responses.len()
            );
        }
        prompts.push(
            request
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        );
        Ok(make_text_response(&self.responses[count]))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

const EMBED_DIMS: usize = 512;

/// Deterministic bag-of-words embedder.
///
/// Lowercased alphanumeric runs are hashed (FNV-1a) into a fixed number of
/// buckets, so texts sharing words have high cosine similarity and texts
/// with no words in common are near zero.
pub struct HashEmbedder;

pub fn hash_embed(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBED_DIMS];
    for token in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in token.to_ascii_lowercase().bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        v[(h % EMBED_DIMS as u64) as usize] += 1.0;
    }
    v
}

#[async_trait::async_trait]
impl Provider for HashEmbedder {
    fn name(&self) -> &str {
        "hash_embedder"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("hash_embedder only embeds".into()))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| hash_embed(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// Embeds like [`HashEmbedder`] for the first `budget` calls, then fails.
pub struct FlakyEmbedder {
    budget: usize,
    calls: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Provider for FlakyEmbedder {
    fn name(&self) -> &str {
        "flaky_embedder"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("flaky_embedder only embeds".into()))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
            return Err(ProviderError::Network("connection reset".into()));
        }
        HashEmbedder.embed(request).await
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }

    async fn embed(&self, _request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}
