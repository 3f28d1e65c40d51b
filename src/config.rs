//! TOML configuration for the resolution service.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub pipelines: PipelinesConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Deadline for one provider adapter call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub adapter_timeout_secs: u64,
    /// Upper bound on postcode candidates fetched per city.
    #[serde(default = "default_candidate_limit")]
    pub city_candidate_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelinesConfig {
    #[serde(default)]
    pub model: bool,
    #[serde(default = "default_true")]
    pub rules: bool,
    #[serde(default)]
    pub geocode: bool,
    #[serde(default)]
    pub capture: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    #[serde(default = "default_capture_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key; the key
    /// itself never lives in the config file.
    #[serde(default = "default_capture_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub language: String,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            adapter_timeout_secs: default_timeout_secs(),
            city_candidate_limit: default_candidate_limit(),
        }
    }
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            model: false,
            rules: true,
            geocode: false,
            capture: false,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_url: default_capture_url(),
            api_key_env: default_capture_key_env(),
            language: String::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    8
}

fn default_candidate_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_index_path() -> PathBuf {
    PathBuf::from("data/places")
}

fn default_capture_url() -> String {
    "https://api.addressy.com".to_string()
}

fn default_capture_key_env() -> String {
    "CAPTURE_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.resolver.adapter_timeout_secs, 8);
        assert_eq!(config.resolver.city_candidate_limit, 10);
        assert!(config.pipelines.rules);
        assert!(!config.pipelines.capture);
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            r#"
            [resolver]
            adapter_timeout_secs = 3

            [pipelines]
            capture = true
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver.adapter_timeout_secs, 3);
        assert!(config.pipelines.capture);
        assert!(config.pipelines.rules);
        assert_eq!(config.capture.base_url, "https://api.addressy.com");
    }
}
