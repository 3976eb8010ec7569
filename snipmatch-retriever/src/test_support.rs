//! Toy embedding provider for tests, compiled with `cfg(test)` or the `test-support` feature.

use async_trait::async_trait;
use half::f16;
use snipmatch_embed::{EmbedError, EmbeddingProvider, EmbeddingResult};
use std::time::Duration;

/// Maps texts to fixed vectors by keyword.
///
/// The first rule whose keyword is a whitespace token of the text decides the vector;
/// texts matching no rule embed to zeros. Vectors are returned as given, not normalized.
/// A text containing the `slow_keyword` sleeps before answering and one containing
/// `fail_keyword` errors.
#[derive(Debug, Clone)]
pub struct KeywordProvider {
    dimension: usize,
    rules: Vec<(String, Vec<f16>)>,
    slow_keyword: Option<(String, Duration)>,
    fail_keyword: Option<String>,
}

impl KeywordProvider {
    pub fn new(dimension: usize, rules: &[(&str, &[f32])]) -> Self {
        Self {
            dimension,
            rules: rules
                .iter()
                .map(|(keyword, vector)| {
                    (
                        keyword.to_string(),
                        vector.iter().copied().map(f16::from_f32).collect(),
                    )
                })
                .collect(),
            slow_keyword: None,
            fail_keyword: None,
        }
    }

    pub fn with_slow_keyword(mut self, keyword: &str, delay: Duration) -> Self {
        self.slow_keyword = Some((keyword.to_string(), delay));
        self
    }

    pub fn with_fail_keyword(mut self, keyword: &str) -> Self {
        self.fail_keyword = Some(keyword.to_string());
        self
    }

    fn vector_for(&self, text: &str) -> Vec<f16> {
        self.rules
            .iter()
            .find(|(keyword, _)| text.split_whitespace().any(|token| token == keyword))
            .map(|(_, vector)| vector.clone())
            .unwrap_or_else(|| vec![f16::ZERO; self.dimension])
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    async fn embed_text(&self, text: &str) -> snipmatch_embed::Result<Vec<f16>> {
        let has = |keyword: &str| text.split_whitespace().any(|token| token == keyword);
        if let Some((keyword, delay)) = &self.slow_keyword {
            if has(keyword) {
                tokio::time::sleep(*delay).await;
            }
        }
        if let Some(keyword) = &self.fail_keyword {
            if has(keyword) {
                return Err(EmbedError::embedding_gen(format!("refusing to embed '{keyword}'")));
            }
        }
        Ok(self.vector_for(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> snipmatch_embed::Result<EmbeddingResult> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_text(text).await?);
        }
        Ok(EmbeddingResult {
            embeddings,
            dimension: self.dimension,
        })
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "keyword-test"
    }
}
