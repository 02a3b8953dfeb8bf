//! Engine configuration.
//!
//! Loaded from `./voxa.yaml`, then `~/.voxa/config.yaml`, then built-in
//! defaults. The confidence threshold lives here so deployments can tune
//! the rejection gate without touching the classifier.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxaConfig {
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Commands scoring below this are treated as not recognized.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Cap on help entries attached to a single response.
    #[serde(default = "default_max_help_entries")]
    pub max_help_entries: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_suggestions: default_max_suggestions(),
            max_help_entries: default_max_help_entries(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.3
}

fn default_max_suggestions() -> usize {
    3
}

fn default_max_help_entries() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_enabled")]
    pub enabled: bool,
    /// Cap on the top-commands / top-error-triggers lists.
    #[serde(default = "default_top_list_size")]
    pub top_list_size: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_analytics_enabled(),
            top_list_size: default_top_list_size(),
        }
    }
}

fn default_analytics_enabled() -> bool {
    true
}

fn default_top_list_size() -> usize {
    10
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./voxa.yaml
    /// 2. ~/.voxa/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<VoxaConfig, ConfigError> {
        let local_config = PathBuf::from("./voxa.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".voxa").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(VoxaConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<VoxaConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: VoxaConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
