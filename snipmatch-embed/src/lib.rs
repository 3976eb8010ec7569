//! # snipmatch-embed
//!
//! Text embedding providers for snipmatch. The [`EmbeddingProvider`] trait is the seam
//! the retrieval engine depends on; [`FastEmbedProvider`] runs a local ONNX sentence
//! embedding model through FastEmbed and [`HashingEmbedProvider`] is a model-free,
//! deterministic fallback for offline use and tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use snipmatch_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = FastEmbedProvider::create(EmbedConfig::default()).await?;
//!
//! let texts = vec!["drop row missing value".to_string(), "plot histogram".to_string()];
//! let result = provider.embed_texts(&texts).await?;
//!
//! println!("Generated {} embeddings of dimension {}",
//!          result.len(), result.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! ## Model loading
//!
//! Loading weights takes seconds, so loaded models are kept in a process-wide cache keyed
//! by a hash of the [`EmbedConfig`]. Two providers created with the same configuration
//! share one model, and concurrent first loads of the same configuration wait for a
//! single load. Embeddings are L2-normalized (unless disabled) and stored as `f16`.
//!
//! ## Timeouts
//!
//! [`embed_with_timeout`] bounds a single query embedding; a timed-out call returns
//! [`EmbedError::Timeout`] without disturbing the provider.

pub mod config;
pub mod error;
pub mod hashing;
pub mod provider;

// Re-export main types for easy access
pub use config::{DEFAULT_MODEL_NAME, EmbedConfig, SUPPORTED_MODELS};
pub use error::{EmbedError, Result};
pub use hashing::{DEFAULT_HASHING_DIMENSION, HashingEmbedProvider};
pub use provider::{
    EmbeddingProvider, EmbeddingResult, FastEmbedProvider, embed_with_timeout, l2_normalize,
};
