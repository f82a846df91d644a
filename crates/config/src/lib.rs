//! Configuration loading, validation, and management for reqlens.
//!
//! Loads configuration from `~/.reqlens/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.reqlens/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared API key, used by any model section without its own key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Embedding model (requirement chunks and code)
    #[serde(default = "default_embedding_model")]
    pub embedding: ModelConfig,

    /// Stage-one model: language-level code review
    #[serde(default = "default_coding_model")]
    pub coding: ModelConfig,

    /// Stage-two model: requirement alignment review
    #[serde(default = "default_review_model")]
    pub review: ModelConfig,

    /// Vector and record store
    #[serde(default)]
    pub store: StoreConfig,

    /// Requirement chunking
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Similarity retrieval
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Submission limits and analysis behavior
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// One model binding: which backend, where, and how to sample.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL override; the provider's default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    fn named(model: &str, temperature: f32) -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_embedding_model() -> ModelConfig {
    ModelConfig::named("nomic-embed-text", 0.0)
}
fn default_coding_model() -> ModelConfig {
    ModelConfig::named("qwen2.5-coder", default_temperature())
}
fn default_review_model() -> ModelConfig {
    ModelConfig::named("llama3.1", default_temperature())
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("embedding", &self.embedding)
            .field("coding", &self.coding)
            .field("review", &self.review)
            .field("store", &self.store)
            .field("chunking", &self.chunking)
            .field("retrieval", &self.retrieval)
            .field("analysis", &self.analysis)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_store_path() -> PathBuf {
    AppConfig::config_dir().join("store.sqlite")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target words per chunk
    #[serde(default = "default_chunk_size")]
    pub size: usize,

    /// Words repeated from the end of the previous chunk
    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    50
}
fn default_chunk_overlap() -> usize {
    10
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: default_chunk_size(),
            overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for a neighbor to count
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f32,

    /// Neighbors considered when resolving by similarity
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_similarity_floor() -> f32 {
    0.5
}
fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_floor: default_similarity_floor(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum code size in characters
    #[serde(default = "default_max_code_size")]
    pub max_code_size: usize,

    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Score reported when the review gives none
    #[serde(default = "default_fallback_score")]
    pub fallback_score: f64,

    /// Run the syntax probe before review (results are logged only)
    #[serde(default = "default_true")]
    pub structure_probe: bool,
}

fn default_max_code_size() -> usize {
    50_000
}
fn default_supported_languages() -> Vec<String> {
    ["java", "python", "javascript", "typescript", "cpp", "c", "go", "rust"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_fallback_score() -> f64 {
    5.0
}
fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_code_size: default_max_code_size(),
            supported_languages: default_supported_languages(),
            fallback_score: default_fallback_score(),
            structure_probe: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.reqlens/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `REQLENS_API_KEY`
    /// - `REQLENS_EMBEDDING_MODEL`, `REQLENS_CODING_MODEL`, `REQLENS_REVIEW_MODEL`
    /// - `REQLENS_STORE_PATH`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("REQLENS_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("REQLENS_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(model) = lookup("REQLENS_CODING_MODEL") {
            self.coding.model = model;
        }
        if let Some(model) = lookup("REQLENS_REVIEW_MODEL") {
            self.review.model = model;
        }
        if let Some(path) = lookup("REQLENS_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".reqlens")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.size == 0 {
            return Err(ConfigError::ValidationError("chunking.size must be > 0".into()));
        }
        if self.chunking.overlap >= self.chunking.size {
            return Err(ConfigError::ValidationError(
                "chunking.overlap must be smaller than chunking.size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.similarity_floor) {
            return Err(ConfigError::ValidationError(
                "retrieval.similarity_floor must be between 0.0 and 1.0".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError("retrieval.top_k must be >= 1".into()));
        }
        if self.analysis.max_code_size == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.max_code_size must be > 0".into(),
            ));
        }
        if self.analysis.supported_languages.is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.supported_languages cannot be empty".into(),
            ));
        }
        for (section, model) in [
            ("embedding", &self.embedding),
            ("coding", &self.coding),
            ("review", &self.review),
        ] {
            if model.temperature < 0.0 || model.temperature > 2.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.temperature must be between 0.0 and 2.0"
                )));
            }
            if model.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.model cannot be empty"
                )));
            }
        }
        match self.store.backend.as_str() {
            "sqlite" | "memory" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "store.backend must be 'sqlite' or 'memory', got '{other}'"
            ))),
        }
    }

    /// The key a model section should use: its own, else the shared one.
    pub fn api_key_for<'a>(&'a self, model: &'a ModelConfig) -> Option<&'a str> {
        model.api_key.as_deref().or(self.api_key.as_deref())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            embedding: default_embedding_model(),
            coding: default_coding_model(),
            review: default_review_model(),
            store: StoreConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            analysis: AnalysisConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
