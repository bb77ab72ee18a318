//! Credential storage backends and the dual-tier credential store.
//!
//! Provides the [`StorageBackend`] trait and implementations:
//! - [`FileStorage`] - JSON file with 0600 permissions (durable tier)
//! - [`MemoryStorage`] - In-memory (ephemeral tier, testing)
//!
//! [`CredentialStore`] layers the tier policy on top: token and user live in
//! exactly one tier at a time, selected by the remember flag, and the flag
//! itself always lives in the durable tier so it can be read before any
//! session exists.

mod file;
mod memory;

use async_trait::async_trait;
use tracing::warn;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use crate::models::auth::User;

/// Storage key for the bearer token.
pub const KEY_TOKEN: &str = "token";

/// Storage key for the serialized user profile.
pub const KEY_USER: &str = "user";

/// Storage key for the remember flag. Durable tier only.
pub const KEY_REMEMBER: &str = "remember_me";

/// Trait for key-value storage backends.
///
/// Backends persist opaque strings. Higher-level encoding (user profile
/// JSON, flag values) is handled by [`CredentialStore`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not
    /// an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Name of this storage backend.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Blanket impl for `Arc<T>`.
#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Blanket impl for `Box<T>`.
#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// The two persistence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives process and browser restart.
    Durable,
    /// Survives in-run navigation only.
    Ephemeral,
}

impl Tier {
    /// Tier selected by the remember flag.
    #[must_use]
    pub fn for_remember(remember: bool) -> Self {
        if remember {
            Tier::Durable
        } else {
            Tier::Ephemeral
        }
    }

    /// The opposite tier.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Tier::Durable => Tier::Ephemeral,
            Tier::Ephemeral => Tier::Durable,
        }
    }
}

/// Dual-tier credential persistence.
///
/// Pure persistence - no network or timer side effects. All session writers
/// go through [`SessionManager`](crate::session::SessionManager); this type
/// only guarantees that the two tiers never both hold a live credential.
pub struct CredentialStore {
    durable: Box<dyn StorageBackend>,
    ephemeral: Box<dyn StorageBackend>,
}

impl CredentialStore {
    /// Create a store over the given tier backends.
    pub fn new(
        durable: impl StorageBackend + 'static,
        ephemeral: impl StorageBackend + 'static,
    ) -> Self {
        Self {
            durable: Box::new(durable),
            ephemeral: Box::new(ephemeral),
        }
    }

    fn backend(&self, tier: Tier) -> &dyn StorageBackend {
        match tier {
            Tier::Durable => &*self.durable,
            Tier::Ephemeral => &*self.ephemeral,
        }
    }

    /// Persist token and user to `tier`, removing any copy from the other
    /// tier so tier selection on restart is unambiguous.
    pub async fn write(&self, tier: Tier, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| crate::error::Error::StorageSerialization(e.to_string()))?;

        let backend = self.backend(tier);
        backend.set(KEY_TOKEN, token).await?;
        backend.set(KEY_USER, &user_json).await?;

        self.clear(tier.other()).await
    }

    /// Read token and user from `tier`.
    ///
    /// A missing or malformed stored user profile yields `None` rather than
    /// an error; the caller treats token-without-user as invalid.
    pub async fn read(&self, tier: Tier) -> Result<(Option<String>, Option<User>)> {
        let backend = self.backend(tier);
        let token = backend.get(KEY_TOKEN).await?;
        let user = match backend.get(KEY_USER).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(tier = ?tier, "Discarding malformed stored user profile: {}", e);
                    None
                }
            },
            None => None,
        };
        Ok((token, user))
    }

    /// Remove token and user from `tier`.
    pub async fn clear(&self, tier: Tier) -> Result<()> {
        let backend = self.backend(tier);
        backend.remove(KEY_TOKEN).await?;
        backend.remove(KEY_USER).await?;
        Ok(())
    }

    /// Remove token and user from both tiers and the remember flag.
    pub async fn clear_all(&self) -> Result<()> {
        self.clear(Tier::Durable).await?;
        self.clear(Tier::Ephemeral).await?;
        self.durable.remove(KEY_REMEMBER).await
    }

    /// Persist the remember flag in the durable tier. `false` removes the
    /// key entirely.
    pub async fn write_remember_flag(&self, remember: bool) -> Result<()> {
        if remember {
            self.durable.set(KEY_REMEMBER, "true").await
        } else {
            self.durable.remove(KEY_REMEMBER).await
        }
    }

    /// Read the remember flag from the durable tier. Missing means `false`.
    pub async fn read_remember_flag(&self) -> Result<bool> {
        Ok(self
            .durable
            .get(KEY_REMEMBER)
            .await?
            .as_deref()
            .map(|v| v == "true")
            .unwrap_or(false))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("durable", &self.durable.name())
            .field("ephemeral", &self.ephemeral.name())
            .finish()
    }
}
