//! Session lifecycle manager.
//!
//! Owns the authenticated/unauthenticated state and its transitions: login,
//! logout, profile fetch, and token refresh. All credential persistence goes
//! through the [`CredentialStore`]; no other component writes credentials.
//!
//! Thread-safe: uses `RwLock` internally so it can be shared across tasks.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{Error, Result};
use crate::models::auth::{ApiErrorBody, LoginRequest, LoginResponse, RefreshResponse, Role, User};
use crate::storage::{CredentialStore, Tier};

/// The live credential pair. Invariant: user is present iff token is.
#[derive(Debug, Clone)]
struct AuthData {
    token: String,
    user: User,
}

/// In-memory session state. `remember` selects the persistence tier and is
/// itself persisted durably.
#[derive(Debug, Default)]
struct SessionState {
    auth: Option<AuthData>,
    remember: bool,
}

/// Manages the session lifecycle.
///
/// The in-memory token held here doubles as the request pipeline's default
/// credential: login and refresh update it, and every outbound request reads
/// it at construction time.
pub struct SessionManager {
    state: RwLock<SessionState>,
    store: Arc<CredentialStore>,
    client: reqwest::Client,
    base_url: String,
}

impl SessionManager {
    /// Create a manager with no session. Call [`restore`](Self::restore) to
    /// pick up a persisted session.
    pub fn new(store: Arc<CredentialStore>, base_url: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            store,
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Set the HTTP client (useful for testing or custom TLS config).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Restore a persisted session, if any.
    ///
    /// Two-phase init: the remember flag is read first (it lives in the
    /// durable tier so it is always reachable), then token and user are read
    /// from the tier the flag selects. A token without a readable user
    /// profile is treated as invalid and cleared.
    pub async fn restore(&self) -> Result<()> {
        let remember = self.store.read_remember_flag().await?;
        let tier = Tier::for_remember(remember);
        match self.store.read(tier).await? {
            (Some(token), Some(user)) => {
                let mut state = self.state.write().await;
                state.auth = Some(AuthData { token, user });
                state.remember = remember;
                info!(tier = ?tier, "Session restored from storage");
            }
            (Some(_), None) => {
                warn!("Stored token without a valid user profile - clearing");
                self.clear_local().await;
            }
            _ => {
                debug!(tier = ?tier, "No persisted session");
            }
        }
        Ok(())
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Authenticate with the login service.
    ///
    /// On success the credentials are persisted into the tier selected by
    /// `remember` and the session becomes Authenticated. On any failure the
    /// session is left fully cleared; a server rejection surfaces as
    /// [`Error::InvalidCredentials`] with the server's message (or a generic
    /// fallback), a transport failure as [`Error::Network`].
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> Result<()> {
        let url = config::join_url(&self.base_url, config::LOGIN_PATH)?;
        let body = LoginRequest { email, password };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                self.clear_local().await;
                return Err(Error::Network(e));
            }
        };

        if !response.status().is_success() {
            let message = read_error_message(response)
                .await
                .unwrap_or_else(|| config::LOGIN_FAILED_FALLBACK.to_string());
            self.clear_local().await;
            return Err(Error::InvalidCredentials(message));
        }

        let data: LoginResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                self.clear_local().await;
                return Err(Error::Network(e));
            }
        };

        let tier = Tier::for_remember(remember);
        if let Err(e) = self.store.write(tier, &data.token, &data.user).await {
            self.clear_local().await;
            return Err(e);
        }
        if let Err(e) = self.store.write_remember_flag(remember).await {
            self.clear_local().await;
            return Err(e);
        }

        let mut state = self.state.write().await;
        state.auth = Some(AuthData {
            token: data.token,
            user: data.user,
        });
        state.remember = remember;
        info!(remember, "Login succeeded");
        Ok(())
    }

    /// Terminate the session.
    ///
    /// The server-side logout call is best-effort: a failure is logged, not
    /// surfaced. Local state and both storage tiers are cleared
    /// unconditionally. Idempotent from Unauthenticated.
    pub async fn logout(&self) {
        if let Some(token) = self.token().await {
            match config::join_url(&self.base_url, config::LOGOUT_PATH) {
                Ok(url) => {
                    match self.client.post(&url).bearer_auth(&token).send().await {
                        Ok(response) if !response.status().is_success() => {
                            warn!(status = response.status().as_u16(), "Logout rejected by server");
                        }
                        Ok(_) => debug!("Logout acknowledged by server"),
                        Err(e) => warn!("Logout request failed: {}", e),
                    }
                }
                Err(e) => warn!("Logout skipped: {}", e),
            }
        }
        self.clear_local().await;
        info!("Session terminated");
    }

    /// Re-fetch the current user's profile and refresh the persisted record.
    ///
    /// No-op when no token is held. A failure invalidates the session: all
    /// state is cleared before the error propagates.
    pub async fn fetch_profile(&self) -> Result<()> {
        let Some(token) = self.token().await else {
            return Ok(());
        };

        let url = config::join_url(&self.base_url, config::PROFILE_PATH)?;
        let response = match self.client.get(&url).bearer_auth(&token).send().await {
            Ok(response) => response,
            Err(e) => {
                self.clear_local().await;
                return Err(Error::Network(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = read_error_message(response)
                .await
                .unwrap_or_else(|| format!("profile fetch returned {}", status));
            self.clear_local().await;
            return Err(Error::SessionExpired(message));
        }

        let user: User = match response.json().await {
            Ok(user) => user,
            Err(e) => {
                self.clear_local().await;
                return Err(Error::Network(e));
            }
        };

        let mut state = self.state.write().await;
        if let Some(auth) = state.auth.as_mut() {
            auth.user = user.clone();
        }
        let tier = Tier::for_remember(state.remember);
        if let Some(auth) = state.auth.as_ref() {
            let token = auth.token.clone();
            if let Err(e) = self.store.write(tier, &token, &user).await {
                warn!("Failed to persist refreshed profile: {}", e);
            }
        }
        debug!("Profile refreshed");
        Ok(())
    }

    /// Exchange the current token for a new one.
    ///
    /// No-op when no token is held. The new token is persisted into the tier
    /// the session already uses - the tier never changes on refresh. A
    /// failure clears all state and propagates; retry policy lives in the
    /// request pipeline, never here.
    pub async fn refresh(&self) -> Result<()> {
        self.refresh_if_current(None).await
    }

    /// Refresh, skipping if the live token no longer matches `stale_token`.
    ///
    /// Runs under the state write lock, so concurrent callers serialize and
    /// a request whose token was already rotated by another caller's refresh
    /// does not trigger a second rotation.
    pub(crate) async fn refresh_if_current(&self, stale_token: Option<&str>) -> Result<()> {
        let mut state = self.state.write().await;

        let (current_token, user) = match state.auth.as_ref() {
            Some(auth) => (auth.token.clone(), auth.user.clone()),
            None => return Ok(()),
        };
        if let Some(stale) = stale_token {
            if current_token != stale {
                debug!("Token already rotated by a concurrent refresh");
                return Ok(());
            }
        }

        let url = config::join_url(&self.base_url, config::REFRESH_PATH)?;
        let response = match self
            .client
            .post(&url)
            .bearer_auth(&current_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.clear_locked(&mut state).await;
                return Err(Error::Network(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = read_error_message(response)
                .await
                .unwrap_or_else(|| format!("refresh returned {}", status));
            self.clear_locked(&mut state).await;
            return Err(Error::SessionExpired(message));
        }

        let data: RefreshResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                self.clear_locked(&mut state).await;
                return Err(Error::Network(e));
            }
        };

        let tier = Tier::for_remember(state.remember);
        if let Err(e) = self.store.write(tier, &data.token, &user).await {
            warn!("Failed to persist refreshed token: {}", e);
        }
        state.auth = Some(AuthData {
            token: data.token,
            user,
        });
        info!("Token refreshed");
        Ok(())
    }

    /// Clear the in-memory session and wipe both storage tiers.
    ///
    /// No network calls. Idempotent, so the pipeline's defensive clear after
    /// an irrecoverable refresh failure is safe even when a failing
    /// transition already cleared the session.
    pub async fn clear_local(&self) {
        let mut state = self.state.write().await;
        self.clear_locked(&mut state).await;
    }

    async fn clear_locked(&self, state: &mut SessionState) {
        state.auth = None;
        state.remember = false;
        if let Err(e) = self.store.clear_all().await {
            warn!("Failed to clear stored credentials: {}", e);
        }
    }

    // ── Read-only surface ────────────────────────────────────────────────────

    /// Whether a session is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.auth.is_some()
    }

    /// Whether the current user has the admin role.
    pub async fn is_admin(&self) -> bool {
        matches!(
            self.state.read().await.auth.as_ref().map(|a| &a.user.role),
            Some(Role::Admin)
        )
    }

    /// Whether the current user has the viewer role.
    pub async fn is_viewer(&self) -> bool {
        matches!(
            self.state.read().await.auth.as_ref().map(|a| &a.user.role),
            Some(Role::Viewer)
        )
    }

    /// Snapshot of the current user's profile.
    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.auth.as_ref().map(|a| a.user.clone())
    }

    /// Snapshot of the current bearer token.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.auth.as_ref().map(|a| a.token.clone())
    }

    /// Whether the current session uses the durable tier.
    pub async fn remember_me(&self) -> bool {
        self.state.read().await.remember
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .finish()
    }
}

/// Pull the `error` field out of an API failure body, if there is one.
async fn read_error_message(response: reqwest::Response) -> Option<String> {
    response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
}
