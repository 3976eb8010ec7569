//! Deterministic text normalization for snippet matching.
//!
//! The [`normalize`](normalize::normalize) pipeline lower-cases, strips markup and URLs,
//! tokenizes, lemmatizes and filters text against a data-science keyword allowlist and an
//! English stopword list. Both corpus entries and incoming queries go through it before
//! being embedded.

pub mod lemma;
pub mod normalize;
pub mod vocab;

pub use lemma::lemmatize;
pub use normalize::{
    TITLE_SUMMARY_SEPARATOR, TextNormalizer, normalize, normalize_opt, normalize_value,
    snippet_embedding_text,
};
