//! Error taxonomy for corpus loading and the match engine.
//!
//! - [`CorpusError`]: the corpus could not be read, parsed, validated or embedded.
//! - [`FatalInitError`]: initialization failed; the engine never becomes ready.
//! - [`EngineError`]: what callers of the engine see, including the recoverable
//!   [`EngineError::NotReady`] and per-query embedding failures.
//!
//! Empty queries, empty corpora and non-positive `top_k` are not errors; they produce
//! empty result lists.

use crate::engine::EngineState;
use snipmatch_embed::EmbedError;
use std::path::PathBuf;
use std::sync::Arc;

/// Failures while turning raw snippet records into a [`crate::corpus::Corpus`].
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The input is not a well-formed sequence of records
    #[error("Malformed corpus: {message}")]
    Malformed { message: String },

    /// A record lacks a required field (or has it set to null)
    #[error("Record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// Two records share a title
    #[error("Duplicate snippet title '{title}' in records {first} and {second}")]
    DuplicateTitle {
        title: String,
        first: usize,
        second: usize,
    },

    /// An embedding does not have the dimension of the rest of the corpus
    #[error("Embedding for '{title}' has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        title: String,
        expected: usize,
        actual: usize,
    },

    /// The corpus file could not be read
    #[error("Failed to read corpus from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedding the corpus failed
    #[error("Failed to embed corpus: {0}")]
    Embedding(#[from] EmbedError),
}

impl CorpusError {
    pub(crate) fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// An error that prevents the engine from reaching the ready state.
#[derive(Debug, thiserror::Error)]
pub enum FatalInitError {
    /// The embedding model could not be loaded
    #[error("Failed to load embedding model: {0}")]
    Model(#[source] EmbedError),

    /// The corpus could not be loaded or built
    #[error("Failed to build corpus: {0}")]
    Corpus(#[from] CorpusError),
}

/// Errors returned by [`crate::engine::MatchEngine`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// A query-time operation was called before initialization completed
    #[error("Engine is not ready (state: {state})")]
    NotReady { state: EngineState },

    /// Initialization failed; the same error is shared by every caller that observed it
    #[error("Engine initialization failed: {0}")]
    Init(Arc<FatalInitError>),

    /// The query could not be embedded (inference failure or timeout)
    #[error("Query embedding failed: {0}")]
    QueryEmbedding(Arc<EmbedError>),

    /// A reload could not build a new corpus; the previous snapshot stays in place
    #[error("Corpus reload failed: {0}")]
    Reload(Arc<CorpusError>),
}

impl EngineError {
    /// Returns `true` if the error is a query embedding timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::QueryEmbedding(e) if e.is_timeout())
    }
}

impl From<EmbedError> for EngineError {
    fn from(error: EmbedError) -> Self {
        Self::QueryEmbedding(Arc::new(error))
    }
}
