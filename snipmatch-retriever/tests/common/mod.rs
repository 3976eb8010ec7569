#![allow(dead_code)]

use snipmatch_retriever::{InMemorySource, MatchEngine, PreloadedProvider, RawSnippet};
use std::sync::Arc;

pub use snipmatch_retriever::test_support::KeywordProvider;

/// Engine over `records` using `provider`, not yet initialized.
pub fn engine(provider: KeywordProvider, records: Vec<RawSnippet>) -> MatchEngine {
    MatchEngine::new(
        Arc::new(InMemorySource::new(records)),
        Arc::new(PreloadedProvider::new(Arc::new(provider))),
    )
}

/// A small pandas corpus in the shape of `snippets/code_base.json`.
pub const SAMPLE_CORPUS: &str = r#"[
  {
    "title": "dropna",
    "summary": "Drop rows with missing values from a DataFrame",
    "body": "df = df.dropna()",
    "tags": ["pandas", "cleaning"]
  },
  {
    "title": "fillna",
    "summary": "Fill missing values with a constant",
    "body": "df = df.fillna(0)",
    "tags": ["pandas", "cleaning"]
  },
  {
    "title": "read_csv",
    "summary": "Load a CSV file into a DataFrame",
    "body": "df = pd.read_csv('data.csv')",
    "tags": ["pandas", "io"]
  },
  {
    "title": "histogram",
    "summary": "Plot a histogram of a numeric column",
    "body": "df['age'].plot.hist(bins=20)",
    "tags": ["plotting"]
  }
]"#;
