//! Main client entry point.

use std::sync::Arc;

use tracing::info;

use crate::config;
use crate::error::Result;
use crate::hooks::{NoopHooks, SessionHooks};
use crate::session::{IdleWatchdog, SessionManager, WatchdogConfig};
use crate::storage::{CredentialStore, FileStorage, MemoryStorage, StorageBackend};
use crate::transport::AuthHttpClient;

/// Assembled session core: state, pipeline, and watchdog.
///
/// # Examples
///
/// ```rust,no_run
/// use session_gate::{SessionClient, SessionClientBuilder};
///
/// # async fn example() -> session_gate::Result<()> {
/// let client = SessionClientBuilder::new()
///     .base_url("https://api.example.com")
///     .build()
///     .await?;
///
/// client.session().login("ada@example.com", "hunter2", true).await?;
/// assert!(client.session().is_authenticated().await);
///
/// let bots: serde_json::Value = client.http().get_json("/api/v1/bots").await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionClient {
    session: Arc<SessionManager>,
    http: Arc<AuthHttpClient>,
    watchdog: Arc<IdleWatchdog>,
}

impl SessionClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::new()
    }

    /// The session state and its transition operations.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The authenticated request pipeline, for collaborators issuing their
    /// own API calls.
    pub fn http(&self) -> &Arc<AuthHttpClient> {
        &self.http
    }

    /// The idle watchdog. Feed it activity signals and activate it after
    /// login; it stays inert for remembered sessions.
    pub fn watchdog(&self) -> &Arc<IdleWatchdog> {
        &self.watchdog
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("session", &self.session)
            .finish()
    }
}

/// Builder for [`SessionClient`].
pub struct SessionClientBuilder {
    base_url: Option<String>,
    durable: Option<Box<dyn StorageBackend>>,
    ephemeral: Option<Box<dyn StorageBackend>>,
    hooks: Option<Arc<dyn SessionHooks>>,
    watchdog_config: WatchdogConfig,
    reqwest_client: Option<reqwest::Client>,
}

impl SessionClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            durable: None,
            ephemeral: None,
            hooks: None,
            watchdog_config: WatchdogConfig::default(),
            reqwest_client: None,
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the durable-tier storage backend. Defaults to
    /// [`FileStorage::default_path`].
    pub fn durable_storage(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.durable = Some(Box::new(backend));
        self
    }

    /// Set the ephemeral-tier storage backend. Defaults to a fresh
    /// [`MemoryStorage`]; pass a shared one to model in-run navigation.
    pub fn ephemeral_storage(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.ephemeral = Some(Box::new(backend));
        self
    }

    /// Set the hooks consumed by the warning UI and route layer.
    pub fn hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Override the watchdog timing parameters.
    pub fn watchdog_config(mut self, config: WatchdogConfig) -> Self {
        self.watchdog_config = config;
        self
    }

    /// Set a custom reqwest client for the session's own network calls.
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    /// Build the client, restoring any persisted session.
    ///
    /// Two-phase init: the remember flag is read first, then token and user
    /// from the tier the flag selects.
    pub async fn build(self) -> Result<SessionClient> {
        let durable = match self.durable {
            Some(backend) => backend,
            None => Box::new(FileStorage::default_path()?),
        };
        let ephemeral = self
            .ephemeral
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let store = Arc::new(CredentialStore::new(durable, ephemeral));

        let base_url = self
            .base_url
            .unwrap_or_else(|| config::DEFAULT_BASE_URL.to_string());
        let hooks = self.hooks.unwrap_or_else(|| Arc::new(NoopHooks));

        let mut manager = SessionManager::new(Arc::clone(&store), base_url);
        if let Some(client) = &self.reqwest_client {
            manager = manager.with_client(client.clone());
        }
        let session = Arc::new(manager);
        session.restore().await?;

        let http = match self.reqwest_client {
            Some(client) => Arc::new(AuthHttpClient::with_client(
                client,
                Arc::clone(&session),
                Arc::clone(&hooks),
            )),
            None => Arc::new(AuthHttpClient::new(
                Arc::clone(&session),
                Arc::clone(&hooks),
            )?),
        };
        let watchdog = Arc::new(IdleWatchdog::new(
            Arc::clone(&session),
            hooks,
            self.watchdog_config,
        ));

        info!("SessionClient initialized");
        Ok(SessionClient {
            session,
            http,
            watchdog,
        })
    }
}

impl Default for SessionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
