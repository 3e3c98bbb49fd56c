//! YAML file-backed settings.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{SettingsError, SettingsStore};
use crate::llm::ProviderConfig;

/// Settings stored as a small YAML document (`vendor`, `credential`).
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<ProviderConfig, SettingsError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProviderConfig::default()),
            Err(e) => return Err(SettingsError::file_io(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(ProviderConfig::default());
        }
        Ok(serde_saphyr::from_str(&contents)?)
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError> {
        let yaml =
            serde_saphyr::to_string(config).map_err(|e| SettingsError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::file_io(parent, e))?;
        }

        atomic_write_file(&self.path, yaml.as_bytes()).await?;
        debug!(path = %self.path.display(), vendor = %config.vendor, "Saved settings");
        Ok(())
    }
}

/// Write data to a temp file, fsync it, then atomically rename to the final path.
///
/// The temp file is owner-only on Unix since it holds the API key.
async fn atomic_write_file(final_path: &Path, data: &[u8]) -> Result<(), SettingsError> {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("settings");
    let temp_path = final_path.with_file_name(format!("{}.{}.tmp", file_name, ulid::Ulid::new()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| SettingsError::file_io(&temp_path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| SettingsError::file_io(&temp_path, e))?;
    }
    file.write_all(data)
        .await
        .map_err(|e| SettingsError::file_io(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| SettingsError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, final_path)
        .await
        .map_err(|e| SettingsError::file_io(final_path, e))?;
    Ok(())
}
