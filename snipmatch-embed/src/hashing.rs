//! Model-free embedding provider based on feature hashing.
//!
//! Each whitespace-separated token and each character trigram of a token is hashed with
//! FNV-1a into one of `dimension` buckets, with the sign taken from a high bit of the
//! hash. The bucket counts are L2-normalized. Texts sharing vocabulary get similar
//! vectors, which is enough to run the engine offline and to write fast tests; it has no
//! notion of synonyms.

use crate::error::{EmbedError, Result};
use crate::provider::{EmbeddingProvider, EmbeddingResult, l2_normalize};
use async_trait::async_trait;
use fnv::FnvHasher;
use half::f16;
use std::hash::Hasher;

/// Default output dimension, matching the default fastembed model.
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Deterministic embedding provider that needs no model weights.
#[derive(Debug, Clone)]
pub struct HashingEmbedProvider {
    dimension: usize,
    name: String,
}

impl Default for HashingEmbedProvider {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_HASHING_DIMENSION,
            name: format!("fnv-hash-{DEFAULT_HASHING_DIMENSION}"),
        }
    }
}

impl HashingEmbedProvider {
    /// Creates a provider producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbedError::invalid_config("dimension must be at least 1"));
        }
        Ok(Self {
            dimension,
            name: format!("fnv-hash-{dimension}"),
        })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = FnvHasher::default();
        hasher.write(feature.as_bytes());
        let hash = hasher.finish();
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    fn embed_sync(&self, text: &str) -> Vec<f16> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            self.add_feature(&mut vector, &token, 1.0);

            let chars: Vec<char> = format!("#{token}#").chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &trigram, 0.5);
            }
        }
        l2_normalize(&mut vector);
        vector.into_iter().map(f16::from_f32).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f16>> {
        Ok(self.embed_sync(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        let embeddings = texts.iter().map(|text| self.embed_sync(text)).collect();
        Ok(EmbeddingResult {
            embeddings,
            dimension: self.dimension,
        })
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
