//! Configuration loading.
//!
//! Settings come from a YAML file with every field defaulted, then a few
//! environment variables (optionally from `.env`) override the file.

use leetcard_core::{ObsidianVault, RenderOptions, TagPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::sync::StoreTarget;

const DEFAULT_FILE: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Full application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anki: AnkiConfig,
    pub catalog: CatalogConfig,
    pub sync: SyncConfig,
    pub card: RenderOptions,
    pub obsidian: Option<ObsidianVault>,
}

/// AnkiConnect endpoint and target deck/note type.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnkiConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub deck_name: String,
    pub model_name: String,
    pub timeout_secs: u64,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8765".to_string(),
            api_key: None,
            deck_name: "LeetCode".to_string(),
            model_name: "LeetCode Problem".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AnkiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Problem catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub graphql_url: String,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://leetcode.com/graphql".to_string(),
            timeout_secs: 10,
            retry_backoff_ms: 500,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Which tags become pattern tags, and which notes are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub tag_prefixes: Vec<String>,
    pub exclude_tags: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag_prefixes: vec!["algorithm/".to_string(), "data-structure/".to_string()],
            exclude_tags: Vec::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default locations when no path is given.
    ///
    /// An explicit path must exist. Without one, `./config.yaml` and then
    /// `<config dir>/leetcard/config.yaml` are tried, and built-in defaults
    /// are used if neither exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ANKI_CONNECT_URL") {
            self.anki.url = url;
        }
        if let Some(key) = lookup("ANKI_CONNECT_KEY") {
            self.anki.api_key = Some(key);
        }
        if let Some(deck) = lookup("ANKI_DECK") {
            self.anki.deck_name = deck;
        }
        if let Some(url) = lookup("LEETCODE_GRAPHQL_URL") {
            self.catalog.graphql_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.anki.deck_name.trim().is_empty() {
            return Err(ConfigError::Invalid("anki.deck_name is empty".to_string()));
        }
        if self.anki.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid("anki.model_name is empty".to_string()));
        }
        if self.sync.tag_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Invalid(
                "sync.tag_prefixes contains an empty prefix".to_string(),
            ));
        }
        if self.anki.timeout_secs == 0 || self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1s".to_string()));
        }
        Ok(())
    }

    pub fn tag_policy(&self) -> TagPolicy {
        TagPolicy::new(self.sync.tag_prefixes.iter().cloned())
    }

    pub fn store_target(&self) -> StoreTarget {
        StoreTarget {
            deck: self.anki.deck_name.clone(),
            model: self.anki.model_name.clone(),
        }
    }
}

fn default_path() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("leetcard").join(DEFAULT_FILE))
        .filter(|path| path.is_file())
}
