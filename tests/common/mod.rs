//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use pdf_assistant::config::{Config, ModelConfig};
use pdf_assistant::provider::{ModelHandles, ModelProvider};

#[path = "../../src/test_support.rs"]
mod fixtures;

pub use fixtures::*;

pub fn provider(generator: Arc<MockGenerator>) -> Arc<ModelProvider> {
    let handles = ModelHandles {
        generator,
        embedder: Arc::new(MockEmbedder::default()),
    };
    Arc::new(ModelProvider::with_handles(ModelConfig::default(), handles))
}

pub fn test_config() -> Config {
    Config::default()
}
