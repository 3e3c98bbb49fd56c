use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::Vendor;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderClientConfig,
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderClientConfig::default(),
            settings_path: default_settings_path(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

/// `$HOME/.lgpt`, or `.lgpt` relative to the working directory without a home.
pub fn data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".lgpt"),
        None => PathBuf::from(".lgpt"),
    }
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.yaml")
}

fn default_settings_path() -> PathBuf {
    data_dir().join("settings.yaml")
}

// ============================================================================
// ProviderClientConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProviderClientConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Per-vendor endpoint overrides, e.g. for a self-hosted gateway.
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            endpoints: EndpointOverrides::default(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

// ============================================================================
// EndpointOverrides
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub openai: Option<String>,
    #[serde(default)]
    pub groq: Option<String>,
}

impl EndpointOverrides {
    pub fn get(&self, vendor: Vendor) -> Option<&str> {
        match vendor {
            Vendor::OpenAI => self.openai.as_deref(),
            Vendor::Groq => self.groq.as_deref(),
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
