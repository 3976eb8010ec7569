//! snipmatch-retriever: match natural-language questions to a curated set of code snippets
//!
//! A corpus of snippet records (title, summary, code body, tags) is normalized and
//! embedded once when the engine initializes. Each query is normalized the same way,
//! embedded, compared against every snippet by cosine similarity and returned as a
//! short list of matches rated from 1 to 5 stars.
//!
//! ## Key Modules
//!
//! - **[`corpus`]**: snippet records, validation and the immutable embedded [`Corpus`]
//! - **[`ranker`]**: cosine similarity, star ratings and top-k selection
//! - **[`engine`]**: the [`MatchEngine`] state machine with one-time initialization
//! - **[`loader`]**: how the engine obtains its embedding provider
//! - **[`config`]**: TOML-loadable [`EngineConfig`]
//! - **[`error`]**: corpus, initialization and query errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snipmatch_retriever::{EngineConfig, MatchEngine, MatchOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = MatchEngine::from_config(&EngineConfig::new("snippets/code_base.json"));
//! engine.initialize().await?;
//!
//! for result in engine
//!     .match_query("How do I drop rows with missing values?", MatchOptions::default())
//!     .await?
//! {
//!     println!("{} ({} stars): {}", result.title, result.score, result.code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! CorpusSource → RawSnippet → TextNormalizer → EmbeddingProvider → Corpus snapshot
//!                                                                        ↓
//! query → TextNormalizer → EmbeddingProvider (with timeout) → Ranker → MatchResult
//! ```

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod loader;
pub mod ranker;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use config::EngineConfig;
pub use corpus::{
    Corpus, CorpusEntry, CorpusIndex, CorpusSource, InMemorySource, JsonFileSource, RawSnippet,
    Snippet,
};
pub use engine::{EngineState, MatchEngine, MatchOptions};
pub use error::{CorpusError, EngineError, FatalInitError};
pub use loader::{FastEmbedLoader, HashingLoader, PreloadedProvider, ProviderLoader};
pub use ranker::{MatchResult, star_rating};
