//! YAML configuration: rotation sources, interval, and LLM settings.
//!
//! ```yaml
//! interval_hours: 4
//! sources:
//!   - name: cnn
//!     index_url: https://lite.cnn.com
//!     link_selector: ".card--lite a[href]"
//!     content_selector: ".headline--lite, .article--lite"
//!   - name: npr
//!     index_url: https://text.npr.org
//!     link_selector: ".topic-title"
//!     content_selector: ".story-head, .paragraphs-container p"
//! ai:
//!   endpoint: https://api.openai.com/v1/chat/completions
//!   model: gpt-4o-mini
//! ```
//!
//! Secrets never live here except the optional `ai.api_key`; the X/Twitter
//! credentials always come from the CLI or environment.

use crate::error::RotationError;
use crate::rotation::{RotationConfig, Source};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

fn default_max_articles() -> usize {
    5
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_system_prompt() -> String {
    "You write a single post for X/Twitter about one news story. \
     Stay under 260 characters, plain text, no hashtags, at most one emoji. \
     Output only the post."
        .to_string()
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Width of each rotation window in hours.
    pub interval_hours: u32,
    /// Sources in rotation order.
    pub sources: Vec<SourceConfig>,
    /// LLM gateway settings.
    #[serde(default)]
    pub ai: AiConfig,
}

/// Where and how to scrape one source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Unique name; also the rotation identity.
    pub name: String,
    /// Page listing recent articles.
    pub index_url: String,
    /// CSS selector for article links on the index page.
    pub link_selector: String,
    /// CSS selector for article body text.
    pub content_selector: String,
    /// Upper bound on links taken from the index.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

/// OpenAI-compatible chat completion settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Falls back to `AI_API_KEY` when absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            sources = config.sources.len(),
            interval_hours = config.interval_hours,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Rotation view over the configured sources, order preserved.
    pub fn rotation(&self) -> Result<RotationConfig, RotationError> {
        RotationConfig::new(
            self.sources.iter().map(|s| Source::new(&s.name)).collect(),
            self.interval_hours,
        )
    }

    /// Scrape settings for the source at `index` in rotation order.
    pub fn source_at(&self, index: usize) -> Option<&SourceConfig> {
        self.sources.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
interval_hours: 4
sources:
  - name: cnn
    index_url: https://lite.cnn.com
    link_selector: ".card--lite a[href]"
    content_selector: ".article--lite"
  - name: npr
    index_url: https://text.npr.org
    link_selector: ".topic-title"
    content_selector: ".paragraphs-container p"
    max_articles: 2
ai:
  model: local-qwen
  endpoint: http://localhost:1234/v1/chat/completions
"#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.interval_hours, 4);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name, "cnn");
        assert_eq!(config.sources[0].max_articles, 5);
        assert_eq!(config.sources[1].max_articles, 2);
        assert_eq!(config.ai.model, "local-qwen");
        assert_eq!(config.ai.max_tokens, 200);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_ai_block_defaults_when_missing() {
        let yaml = r#"
interval_hours: 6
sources:
  - name: a
    index_url: https://a.example
    link_selector: a
    content_selector: p
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.ai.endpoint, default_endpoint());
        assert!(!config.ai.system_prompt.is_empty());
    }

    #[test]
    fn test_rotation_preserves_order() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        let rotation = config.rotation().unwrap();
        let names: Vec<&str> = rotation.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["cnn", "npr"]);
        assert_eq!(rotation.interval_hours(), 4);
        assert_eq!(config.source_at(1).unwrap().name, "npr");
        assert!(config.source_at(2).is_none());
    }

    #[test]
    fn test_rotation_rejects_empty_source_list() {
        let config = AppConfig::from_yaml("interval_hours: 4\nsources: []\n").unwrap();
        assert_eq!(config.rotation().unwrap_err(), RotationError::NoSources);
    }

    #[test]
    fn test_missing_interval_is_parse_error() {
        assert!(AppConfig::from_yaml("sources: []\n").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, SAMPLE).await.unwrap();
        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.sources.len(), 2);
    }
}
