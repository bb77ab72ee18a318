//! File-based storage with secure permissions - the durable tier.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use super::StorageBackend;
use crate::error::{Error, Result};

/// File-based key-value storage using JSON with 0600 permissions.
///
/// Serves as the durable tier: contents survive process restart.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create storage at the specified path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create storage at the default path: `~/.config/session-gate/credentials.json`
    pub fn default_path() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot determine config directory".into()))?;
        let path = config_dir.join("session-gate").join("credentials.json");
        Ok(Self::new(path))
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::storage_io(&self.path, e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| Error::StorageSerialization(e.to_string()))
    }

    fn write_all(&self, data: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::storage_io(parent, e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::StorageSerialization(e.to_string()))?;
        std::fs::write(&self.path, &content)
            .map_err(|e| Error::storage_io(&self.path, e.to_string()))?;

        // Set 0600 permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| Error::storage_io(&self.path, format!("chmod: {}", e)))?;
        }

        debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self.read_all()?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.read_all()?;
        data.insert(key.to_string(), value.to_string());
        self.write_all(&data)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.read_all()?;
        if data.remove(key).is_some() {
            self.write_all(&data)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let storage = FileStorage::new(&path);

        assert!(storage.get("token").await.unwrap().is_none());

        storage.set("token", "abc").await.unwrap();
        storage.set("remember_me", "true").await.unwrap();

        // A second instance over the same path sees the data - this is the
        // restart survival property of the durable tier.
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("token").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(
            reopened.get("remember_me").await.unwrap().as_deref(),
            Some("true")
        );

        reopened.remove("token").await.unwrap();
        assert!(storage.get("token").await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let storage = FileStorage::new(&path);
        storage.set("token", "abc").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
