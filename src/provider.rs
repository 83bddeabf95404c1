//! Lazily-initialized model handles.
//!
//! A [`ModelProvider`] is created once at process start and passed by
//! reference to everything that needs a model. The generation and embedding
//! handles are built on first access and the same pair is returned for the
//! rest of the process lifetime.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

use crate::config::ModelConfig;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::generation::{Generator, OllamaGenerator};

/// The pair of shared model handles.
#[derive(Clone)]
pub struct ModelHandles {
    pub generator: Arc<dyn Generator>,
    pub embedder: Arc<dyn Embedder>,
}

impl ModelHandles {
    /// Build Ollama-backed handles for `config`.
    pub fn ollama(config: &ModelConfig) -> Result<Self> {
        Ok(Self {
            generator: Arc::new(OllamaGenerator::new(config)?),
            embedder: Arc::new(OllamaEmbedder::new(config)?),
        })
    }
}

pub struct ModelProvider {
    config: ModelConfig,
    handles: OnceCell<ModelHandles>,
}

impl ModelProvider {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            handles: OnceCell::new(),
        }
    }

    /// A provider whose handles are already in place.
    pub fn with_handles(config: ModelConfig, handles: ModelHandles) -> Self {
        Self {
            config,
            handles: OnceCell::new_with(Some(handles)),
        }
    }

    /// Return the shared handles, constructing them on the first call.
    pub async fn handles(&self) -> Result<&ModelHandles> {
        self.handles
            .get_or_try_init(|| async {
                tracing::info!(
                    url = %self.config.url,
                    generation_model = %self.config.generation_model,
                    embedding_model = %self.config.embedding_model,
                    "initializing model handles"
                );
                ModelHandles::ollama(&self.config)
            })
            .await
    }

    pub async fn generator(&self) -> Result<Arc<dyn Generator>> {
        Ok(self.handles().await?.generator.clone())
    }

    pub async fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        Ok(self.handles().await?.embedder.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.handles.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handles_built_once_and_reused() {
        let provider = ModelProvider::new(ModelConfig::default());
        assert!(!provider.is_initialized());

        let first = provider.handles().await.unwrap().clone();
        assert!(provider.is_initialized());
        let second = provider.handles().await.unwrap();

        assert!(Arc::ptr_eq(&first.generator, &second.generator));
        assert!(Arc::ptr_eq(&first.embedder, &second.embedder));
        assert_eq!(second.generator.model_name(), "mistral");
        assert_eq!(second.embedder.model_name(), "mistral");
    }

    #[tokio::test]
    async fn test_accessors_share_handles() {
        let provider = ModelProvider::new(ModelConfig::default());
        let g1 = provider.generator().await.unwrap();
        let g2 = provider.generator().await.unwrap();
        assert!(Arc::ptr_eq(&g1, &g2));
    }
}
