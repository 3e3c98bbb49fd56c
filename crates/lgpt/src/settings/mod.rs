//! Persistence for the provider configuration.
//!
//! The conversation store loads settings once at start-up and saves them
//! whenever the vendor or credential changes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::llm::ProviderConfig;

mod file;

pub use file::FileSettingsStore;

/// Storage backend for [`ProviderConfig`].
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load saved settings, or defaults when nothing has been saved yet.
    async fn load(&self) -> Result<ProviderConfig, SettingsError>;

    /// Persist `config`, replacing whatever was saved before.
    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError>;
}

/// In-memory settings, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: RwLock<Option<ProviderConfig>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProviderConfig) -> Self {
        Self {
            saved: RwLock::new(Some(config)),
        }
    }

    /// Last saved value, if any.
    pub async fn saved(&self) -> Option<ProviderConfig> {
        self.saved.read().await.clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<ProviderConfig, SettingsError> {
        Ok(self.saved.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError> {
        *self.saved.write().await = Some(config.clone());
        Ok(())
    }
}

/// Errors from loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(String),
}

impl SettingsError {
    pub(crate) fn file_io(path: &Path, source: std::io::Error) -> Self {
        SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
