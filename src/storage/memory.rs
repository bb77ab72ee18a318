//! In-memory storage - the ephemeral tier.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::StorageBackend;
use crate::error::Result;

/// In-memory key-value storage.
///
/// Serves as the ephemeral tier: contents survive as long as the value is
/// alive (clone the `Arc` holding it across "navigations"), but never a
/// fresh process start. Also the storage of choice in tests.
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
