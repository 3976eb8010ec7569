//! Where snippet records come from.

use super::{RawSnippet, parse_records};
use crate::error::CorpusError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Supplies the raw snippet records the corpus is built from.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Read every record. Called once at initialization and once per reload.
    async fn load_records(&self) -> Result<Vec<RawSnippet>, CorpusError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Read a JSON array of snippet records from `path`.
pub async fn load_corpus_records(path: &Path) -> Result<Vec<RawSnippet>, CorpusError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        CorpusError::malformed(format!("{} is not valid JSON: {e}", path.display()))
    })?;
    parse_records(&value)
}

/// Records stored as a JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CorpusSource for JsonFileSource {
    async fn load_records(&self) -> Result<Vec<RawSnippet>, CorpusError> {
        load_corpus_records(&self.path).await
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// Records held in memory, for embedding the engine in other programs and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawSnippet>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawSnippet>) -> Self {
        Self { records }
    }

    /// Parse records from a JSON value that must be an array of objects.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CorpusError> {
        Ok(Self::new(parse_records(value)?))
    }
}

#[async_trait]
impl CorpusSource for InMemorySource {
    async fn load_records(&self) -> Result<Vec<RawSnippet>, CorpusError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_json_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"[{{"title": "dropna", "summary": "Drop rows with missing values", "body": "df.dropna()", "tags": ["pandas"]}}]"#
        )?;

        let source = JsonFileSource::new(file.path());
        let records = source.load_records().await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("dropna"));
        assert_eq!(records[0].tags, Some(vec!["pandas".to_string()]));
        assert!(source.describe().contains("json file"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = load_corpus_records(Path::new("/nonexistent/snippets/code_base.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
        assert!(err.to_string().contains("code_base.json"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "[{{\"title\": ")?;
        let err = load_corpus_records(file.path()).await.unwrap_err();
        assert!(matches!(err, CorpusError::Malformed { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemorySource::from_value(&serde_json::json!([
            {"title": "a", "summary": "b", "body": "c"}
        ]))
        .unwrap();
        assert_eq!(source.load_records().await.unwrap().len(), 1);
        assert_eq!(source.describe(), "1 in-memory records");

        assert!(InMemorySource::from_value(&serde_json::json!("nope")).is_err());
    }
}
