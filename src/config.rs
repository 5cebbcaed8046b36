use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Sentiment;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lexicon: Lexicon,
    pub storage: StorageConfig,
}

/// Stem dictionaries used by the classifier.
///
/// Each entry is a lowercase word start; a stem matches when a word in the
/// text begins with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub negative: Vec<String>,
    pub positive: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            negative: vec![
                "плох".to_string(),
                "ненавиж".to_string(),
                "ужасн".to_string(),
                "глюч".to_string(),
            ],
            positive: vec![
                "хорош".to_string(),
                "люблю".to_string(),
                "круто".to_string(),
                "отличн".to_string(),
            ],
        }
    }
}

impl Lexicon {
    /// Stems for a sentiment; neutral is the fallback and has none
    pub fn stems(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Negative => &self.negative,
            Sentiment::Positive => &self.positive,
            Sentiment::Neutral => &[],
        }
    }
}

/// Which persistence backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub json_path: PathBuf,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "sqlite://reviews.db".to_string(),
            json_path: PathBuf::from(".sentiment-reviews/reviews"),
            max_connections: 5,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Load configuration from the default location (.sentiment-reviews/config.yml)
    pub fn load_default() -> Result<Self> {
        Self::load(".sentiment-reviews/config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lexicon.negative.len(), 4);
        assert_eq!(config.lexicon.positive.len(), 4);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.max_connections, 5);
    }

    #[test]
    fn test_neutral_has_no_stems() {
        let lexicon = Lexicon::default();
        assert!(lexicon.stems(Sentiment::Neutral).is_empty());
        assert!(lexicon
            .stems(Sentiment::Negative)
            .contains(&"ужасн".to_string()));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
lexicon:
  negative:
    - bad
    - hate
  positive:
    - good

storage:
  backend: json
  json_path: /tmp/reviews
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lexicon.negative, vec!["bad", "hate"]);
        assert_eq!(config.lexicon.positive, vec!["good"]);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.storage.json_path, PathBuf::from("/tmp/reviews"));
        // Unspecified fields keep their defaults
        assert_eq!(config.storage.database_url, "sqlite://reviews.db");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.lexicon.positive, Lexicon::default().positive);
    }
}
