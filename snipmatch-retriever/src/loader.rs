//! Deferred construction of the embedding provider.
//!
//! The engine does not hold a provider until it initializes. A [`ProviderLoader`] is
//! what it calls, exactly once per successful initialization, to get one.

use async_trait::async_trait;
use snipmatch_embed::{EmbedConfig, EmbedError, EmbeddingProvider, FastEmbedProvider, HashingEmbedProvider};
use std::sync::Arc;
use tracing::info;

/// Produces the embedding provider used for the lifetime of an engine.
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    /// Load (and validate) the provider. May be slow: model weights can be downloaded here.
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>, EmbedError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Loads a local fastembed model.
#[derive(Debug, Clone)]
pub struct FastEmbedLoader {
    config: EmbedConfig,
}

impl FastEmbedLoader {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProviderLoader for FastEmbedLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>, EmbedError> {
        let provider = FastEmbedProvider::create(self.config.clone()).await?;
        info!(
            "Loaded fastembed model {} (dimension {})",
            self.config.model_name(),
            provider.embedding_dimension()
        );
        Ok(Arc::new(provider))
    }

    fn describe(&self) -> String {
        format!("fastembed model {}", self.config.model_name())
    }
}

/// Builds the model-free feature-hashing provider.
#[derive(Debug, Clone, Copy)]
pub struct HashingLoader {
    dimension: usize,
}

impl HashingLoader {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingLoader {
    fn default() -> Self {
        Self::new(snipmatch_embed::DEFAULT_HASHING_DIMENSION)
    }
}

#[async_trait]
impl ProviderLoader for HashingLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>, EmbedError> {
        Ok(Arc::new(HashingEmbedProvider::new(self.dimension)?))
    }

    fn describe(&self) -> String {
        format!("feature hashing (dimension {})", self.dimension)
    }
}

/// Hands out a provider that already exists.
#[derive(Clone)]
pub struct PreloadedProvider {
    provider: Arc<dyn EmbeddingProvider>,
}

impl PreloadedProvider {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ProviderLoader for PreloadedProvider {
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>, EmbedError> {
        Ok(Arc::clone(&self.provider))
    }

    fn describe(&self) -> String {
        format!("preloaded provider {}", self.provider.provider_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hashing_loader() {
        let provider = HashingLoader::new(16).load().await.unwrap();
        assert_eq!(provider.embedding_dimension(), 16);
        assert!(HashingLoader::new(0).load().await.is_err());
        assert!(HashingLoader::default().describe().contains("384"));
    }

    #[tokio::test]
    async fn test_preloaded_returns_same_provider() {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbedProvider::new(8).unwrap());
        let loader = PreloadedProvider::new(Arc::clone(&provider));
        let loaded = loader.load().await.unwrap();
        assert!(Arc::ptr_eq(&provider, &loaded));
        assert_eq!(loader.describe(), "preloaded provider fnv-hash-8");
    }

    #[tokio::test]
    async fn test_fastembed_loader_rejects_unknown_model() {
        let loader = FastEmbedLoader::new(EmbedConfig::new("definitely-not-a-model"));
        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, EmbedError::UnknownModel { .. }));
    }
}
