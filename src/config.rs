//! TOML configuration parsing and validation.
//!
//! Every setting has a built-in default matching the fixed local deployment
//! (Ollama on `127.0.0.1:11434`, the `mistral` model, a store under
//! `./pdf_chroma_db`). A configuration file is optional: when the path given
//! to [`load_config`] does not exist, [`Config::default`] is returned.
//!
//! ```toml
//! [model]
//! url = "http://127.0.0.1:11434"
//! generation_model = "mistral"
//! embedding_model = "mistral"
//!
//! [store]
//! path = "./pdf_chroma_db/store.sqlite"
//!
//! [chunking]
//! chunk_size = 512
//! chunk_overlap = 128
//!
//! [retrieval]
//! top_k = 4
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::prompt::{CONTEXT_SLOT, INPUT_SLOT};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Connection settings for the local model-serving endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub generation_model: String,
    #[serde(default = "default_model")]
    pub embedding_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure. Zero disables retrying.
    #[serde(default)]
    pub max_retries: u32,
    /// Number of chunk texts sent per embedding request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            generation_model: default_model(),
            embedding_model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            batch_size: default_batch_size(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_model() -> String {
    "mistral".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_batch_size() -> usize {
    32
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./pdf_chroma_db/store.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    512
}
fn default_chunk_overlap() -> usize {
    128
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Replaces the built-in prompt. Must contain `{context}` and `{input}`.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            prompt_template: None,
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// Pause between streamed tokens, in milliseconds.
    #[serde(default)]
    pub token_delay_ms: u64,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            token_delay_ms: 0,
            color: default_color(),
        }
    }
}

fn default_color() -> bool {
    true
}

/// Load and validate the configuration at `path`.
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate chunking
    if config.chunking.chunk_size == 0 {
        bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        bail!(
            "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
            config.chunking.chunk_overlap,
            config.chunking.chunk_size
        );
    }

    // Validate retrieval
    if config.retrieval.top_k < 1 {
        bail!("retrieval.top_k must be >= 1");
    }
    if let Some(template) = &config.retrieval.prompt_template {
        for slot in [CONTEXT_SLOT, INPUT_SLOT] {
            if !template.contains(slot) {
                bail!("retrieval.prompt_template must contain the {} slot", slot);
            }
        }
    }

    // Validate model endpoint
    if !(config.model.url.starts_with("http://") || config.model.url.starts_with("https://")) {
        bail!(
            "model.url must start with http:// or https://, got '{}'",
            config.model.url
        );
    }
    if config.model.batch_size == 0 {
        bail!("model.batch_size must be >= 1");
    }

    Ok(())
}
