//! Snippet records and the immutable, embedded corpus built from them.
//!
//! ## Key Components
//!
//! - **RawSnippet**: a record as it appears in the corpus file, every field optional
//! - **Snippet**: a validated record with required title, summary and body
//! - **CorpusEntry**: a snippet with its normalized text and embedding
//! - **Corpus**: title-keyed, load-ordered collection of entries; never mutated
//! - **CorpusIndex**: builds a [`Corpus`] from raw records using a normalizer and provider
//!
//! Titles are unique keys. Duplicate titles are rejected with
//! [`CorpusError::DuplicateTitle`] rather than resolved silently.

pub mod source;

use crate::error::CorpusError;
use half::f16;
use serde::{Deserialize, Serialize};
use snipmatch_embed::EmbeddingProvider;
use snipmatch_text::{TextNormalizer, snippet_embedding_text};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub use source::{CorpusSource, InMemorySource, JsonFileSource, load_corpus_records};

/// A snippet record as read from the corpus definition, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnippet {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl RawSnippet {
    /// Convenience constructor for a complete record.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        body: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        Self {
            title: Some(title.into()),
            summary: Some(summary.into()),
            body: Some(body.into()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    /// Check required fields and produce a [`Snippet`].
    ///
    /// `index` is the record's position in the input and is only used for error reports.
    pub fn validate(self, index: usize) -> Result<Snippet, CorpusError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(CorpusError::MissingField {
                index,
                field: "title",
            })?;
        let summary = self.summary.ok_or(CorpusError::MissingField {
            index,
            field: "summary",
        })?;
        let body = self.body.ok_or(CorpusError::MissingField {
            index,
            field: "body",
        })?;

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.unwrap_or_default() {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Snippet {
            title,
            summary,
            body,
            tags,
        })
    }
}

/// A validated code snippet. `title` is its unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub title: String,
    pub summary: String,
    pub body: String,
    /// Tags in first-occurrence order, without duplicates
    pub tags: Vec<String>,
}

impl Snippet {
    /// The text that gets normalized and embedded for this snippet.
    pub fn embedding_text(&self) -> String {
        snippet_embedding_text(&self.title, &self.summary)
    }
}

/// A snippet together with its normalized text and embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub snippet: Snippet,
    pub normalized_text: String,
    pub embedding: Vec<f16>,
}

impl CorpusEntry {
    pub fn title(&self) -> &str {
        &self.snippet.title
    }
}

/// Immutable title-keyed collection of corpus entries.
///
/// Iteration follows the order the records were loaded in.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    by_title: HashMap<String, usize>,
    dimension: usize,
}

impl Corpus {
    /// An empty corpus whose entries would have `dimension` components.
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    /// Assemble a corpus from prepared entries, enforcing unique titles and a common
    /// embedding dimension.
    pub fn from_entries(entries: Vec<CorpusEntry>, dimension: usize) -> Result<Self, CorpusError> {
        let mut by_title = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.embedding.len() != dimension {
                return Err(CorpusError::DimensionMismatch {
                    title: entry.title().to_string(),
                    expected: dimension,
                    actual: entry.embedding.len(),
                });
            }
            if let Some(first) = by_title.insert(entry.title().to_string(), index) {
                return Err(CorpusError::DuplicateTitle {
                    title: entry.title().to_string(),
                    first,
                    second: index,
                });
            }
        }
        Ok(Self {
            entries,
            by_title,
            dimension,
        })
    }

    /// Find an entry by title.
    pub fn lookup(&self, title: &str) -> Option<&CorpusEntry> {
        self.by_title.get(title).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter()
    }

    /// Titles in load order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.title())
    }

    /// Dimension shared by every embedding in the corpus.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Parse a JSON value that must be an array of snippet objects.
pub fn parse_records(value: &serde_json::Value) -> Result<Vec<RawSnippet>, CorpusError> {
    let items = value.as_array().ok_or_else(|| {
        CorpusError::malformed(format!(
            "expected an array of snippet records, found {}",
            json_kind(value)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(CorpusError::malformed(format!(
                    "record {index} is {}, expected an object",
                    json_kind(item)
                )));
            }
            serde_json::from_value(item.clone())
                .map_err(|e| CorpusError::malformed(format!("record {index}: {e}")))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Builds corpora with a fixed normalizer and embedding provider.
///
/// The engine keeps one index for its lifetime so that a reload embeds new records with
/// the same model as the first corpus.
#[derive(Clone)]
pub struct CorpusIndex {
    normalizer: TextNormalizer,
    provider: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("provider", &self.provider.provider_name())
            .field("dimension", &self.provider.embedding_dimension())
            .finish()
    }
}

impl CorpusIndex {
    pub fn new(normalizer: TextNormalizer, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            normalizer,
            provider,
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Validate, normalize and embed `records` into a new [`Corpus`].
    ///
    /// All records are validated and checked for duplicate titles before any embedding
    /// work starts; embeddings are then computed in one batched call.
    pub async fn build(&self, records: Vec<RawSnippet>) -> Result<Corpus, CorpusError> {
        let mut snippets = Vec::with_capacity(records.len());
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let snippet = record.validate(index)?;
            if let Some(first) = seen.insert(snippet.title.clone(), index) {
                return Err(CorpusError::DuplicateTitle {
                    title: snippet.title,
                    first,
                    second: index,
                });
            }
            snippets.push(snippet);
        }

        let normalized: Vec<String> = snippets
            .iter()
            .map(|snippet| {
                let text = self.normalizer.normalize(&snippet.embedding_text());
                debug!("Preprocessed '{}': '{}'", snippet.title, text);
                text
            })
            .collect();

        let dimension = self.provider.embedding_dimension();
        let embeddings = self.provider.embed_texts(&normalized).await?;
        if embeddings.len() != snippets.len() {
            return Err(CorpusError::malformed(format!(
                "provider returned {} embeddings for {} snippets",
                embeddings.len(),
                snippets.len()
            )));
        }

        let entries = snippets
            .into_iter()
            .zip(normalized)
            .zip(embeddings.embeddings)
            .map(|((snippet, normalized_text), embedding)| CorpusEntry {
                snippet,
                normalized_text,
                embedding,
            })
            .collect();

        let corpus = Corpus::from_entries(entries, dimension)?;
        info!(
            "Corpus built: {} snippets embedded with {} (dimension {})",
            corpus.len(),
            self.provider.provider_name(),
            dimension
        );
        Ok(corpus)
    }

    /// Parse `value` as an array of records and build a corpus from it.
    pub async fn build_from_value(&self, value: &serde_json::Value) -> Result<Corpus, CorpusError> {
        self.build(parse_records(value)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::KeywordProvider;
    use serde_json::json;

    fn index() -> CorpusIndex {
        CorpusIndex::new(
            TextNormalizer::new(),
            Arc::new(KeywordProvider::new(
                2,
                &[("dropna", &[1.0, 0.0]), ("fillna", &[0.0, 1.0])],
            )),
        )
    }

    #[tokio::test]
    async fn test_build_and_lookup() {
        let corpus = index()
            .build(vec![
                RawSnippet::new("dropna", "Drop rows with missing values", "df.dropna()", &["pandas", "cleaning", "pandas"]),
                RawSnippet::new("fillna", "Fill missing values", "df.fillna(0)", &[]),
            ])
            .await
            .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dimension(), 2);
        assert_eq!(corpus.titles().collect::<Vec<_>>(), vec!["dropna", "fillna"]);

        let entry = corpus.lookup("dropna").unwrap();
        assert_eq!(entry.normalized_text, "dropna drop row missing value");
        assert_eq!(entry.snippet.body, "df.dropna()");
        assert_eq!(entry.snippet.tags, vec!["pandas", "cleaning"]);
        assert_eq!(entry.embedding, vec![f16::ONE, f16::ZERO]);
        assert!(corpus.lookup("merge").is_none());
    }

    #[tokio::test]
    async fn test_empty_records_build_empty_corpus() {
        let corpus = index().build(vec![]).await.unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.dimension(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_title_rejected() {
        let err = index()
            .build(vec![
                RawSnippet::new("dropna", "a", "x", &[]),
                RawSnippet::new("fillna", "b", "y", &[]),
                RawSnippet::new("dropna", "c", "z", &[]),
            ])
            .await
            .unwrap_err();
        match err {
            CorpusError::DuplicateTitle {
                title,
                first,
                second,
            } => {
                assert_eq!(title, "dropna");
                assert_eq!((first, second), (0, 2));
            }
            other => panic!("expected DuplicateTitle, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let value = json!([
            {"title": "dropna", "summary": "Drop rows", "body": "df.dropna()"},
            {"title": "fillna", "body": "df.fillna(0)"}
        ]);
        let err = index().build_from_value(&value).await.unwrap_err();
        assert!(matches!(
            err,
            CorpusError::MissingField {
                index: 1,
                field: "summary"
            }
        ));

        let value = json!([{"title": null, "summary": "s", "body": "b"}]);
        let err = index().build_from_value(&value).await.unwrap_err();
        assert!(matches!(err, CorpusError::MissingField { field: "title", .. }));

        let value = json!([{"title": "  ", "summary": "s", "body": "b"}]);
        let err = index().build_from_value(&value).await.unwrap_err();
        assert!(matches!(err, CorpusError::MissingField { field: "title", .. }));
    }

    #[test]
    fn test_tags_optional() {
        let records = parse_records(&json!([
            {"title": "t", "summary": "s", "body": "b"},
            {"title": "u", "summary": "s", "body": "b", "tags": null}
        ]))
        .unwrap();
        for (i, record) in records.into_iter().enumerate() {
            assert!(record.validate(i).unwrap().tags.is_empty());
        }
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            parse_records(&json!({"title": "dropna"})),
            Err(CorpusError::Malformed { .. })
        ));
        assert!(matches!(
            parse_records(&json!(["dropna"])),
            Err(CorpusError::Malformed { .. })
        ));
        let err = parse_records(&json!([{"title": 5, "summary": "s", "body": "b"}])).unwrap_err();
        assert!(err.to_string().contains("record 0"));
    }

    #[test]
    fn test_from_entries_checks_dimension() {
        let entry = CorpusEntry {
            snippet: RawSnippet::new("a", "b", "c", &[]).validate(0).unwrap(),
            normalized_text: String::new(),
            embedding: vec![f16::ONE; 3],
        };
        let err = Corpus::from_entries(vec![entry], 2).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }
}
