//! Engine configuration, loadable from a TOML file.
//!
//! Every field has a default, so a config file only needs the settings it changes:
//!
//! ```toml
//! corpus_path = "snippets/code_base.json"
//! query_timeout_ms = 5000
//!
//! [embed]
//! model_name = "bge-small-en-v1.5"
//! batch_size = 16
//! ```

use crate::engine::MatchOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snipmatch_embed::EmbedConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the snippet corpus, relative to the working directory.
pub const DEFAULT_CORPUS_PATH: &str = "snippets/code_base.json";

/// Configuration for a [`crate::MatchEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JSON file holding the snippet records
    pub corpus_path: PathBuf,
    /// Embedding model settings
    pub embed: EmbedConfig,
    /// Bound on embedding a single query, in milliseconds
    pub query_timeout_ms: u64,
    pub default_top_k: i64,
    pub default_min_stars: i64,
    /// Use the model-free hashing provider instead of downloading a model
    pub offline: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            embed: EmbedConfig::default(),
            query_timeout_ms: 10_000,
            default_top_k: 3,
            default_min_stars: 2,
            offline: false,
        }
    }
}

impl EngineConfig {
    /// Configuration reading the corpus from `corpus_path`, with defaults otherwise.
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Invalid engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In config file {}", path.display()))
    }

    /// Check settings that would otherwise only fail at initialization or query time.
    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == 0 {
            anyhow::bail!("query_timeout_ms must be at least 1");
        }
        if !self.offline {
            self.embed.validate()?;
        }
        Ok(())
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_query_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.query_timeout_ms = timeout_ms;
        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Options used when a query does not specify its own.
    pub fn default_match_options(&self) -> MatchOptions {
        MatchOptions::new(self.default_top_k, self.default_min_stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.corpus_path, PathBuf::from("snippets/code_base.json"));
        assert_eq!(config.query_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_match_options(), MatchOptions::default());
        assert_eq!(config.embed.model_name(), snipmatch_embed::DEFAULT_MODEL_NAME);
        assert!(!config.offline);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            corpus_path = "data/snippets.json"
            default_top_k = 5

            [embed]
            model_name = "bge-small-en-v1.5"
            batch_size = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.corpus_path, PathBuf::from("data/snippets.json"));
        assert_eq!(config.default_match_options(), MatchOptions::new(5, 2));
        assert_eq!(config.embed.model_name(), "bge-small-en-v1.5");
        assert_eq!(config.embed.batch_size, 8);
        assert!(config.embed.normalize);
    }

    #[test]
    fn test_timeout_override() {
        let config = EngineConfig::from_toml_str("query_timeout_ms = 250")
            .unwrap()
            .with_query_timeout_ms(1500);
        assert_eq!(config.query_timeout(), Duration::from_millis(1500));
        config.validate().unwrap();
        assert!(config.with_query_timeout_ms(0).validate().is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(EngineConfig::from_toml_str("query_timeout_ms = 0").is_err());
        assert!(EngineConfig::from_toml_str("[embed]\nmodel_name = \"nope\"").is_err());
        assert!(EngineConfig::from_toml_str("default_top_k = \"three\"").is_err());
        // Unknown models are fine when no model is loaded
        EngineConfig::from_toml_str("offline = true\n[embed]\nmodel_name = \"nope\"").unwrap();
    }

    #[test]
    fn test_load_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "offline = true\nquery_timeout_ms = 250")?;
        let config = EngineConfig::load(file.path())?;
        assert!(config.offline);
        assert_eq!(config.query_timeout(), Duration::from_millis(250));

        let err = EngineConfig::load(Path::new("/nonexistent/snipmatch.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("snipmatch.toml"));
        Ok(())
    }
}
