//! Authenticated HTTP pipeline with single-flight retry on expiry.
//!
//! Every outbound call picks up the session's current bearer token. A 401
//! triggers one token refresh and one replay of the original request; a
//! second 401 propagates without further recovery, which bounds refresh
//! loops no matter how the server behaves.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config;
use crate::error::{Error, Result};
use crate::hooks::{LoginRedirect, SessionHooks};
use crate::session::SessionManager;

/// HTTP client that attaches the session's bearer credential and recovers
/// from a single expired-token failure per request.
pub struct AuthHttpClient {
    client: reqwest::Client,
    session: Arc<SessionManager>,
    hooks: Arc<dyn SessionHooks>,
}

impl AuthHttpClient {
    /// Create a new pipeline over the given session.
    pub fn new(session: Arc<SessionManager>, hooks: Arc<dyn SessionHooks>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config::CONNECT_TIMEOUT)
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            session,
            hooks,
        })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(
        client: reqwest::Client,
        session: Arc<SessionManager>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        Self {
            client,
            session,
            hooks,
        }
    }

    /// Send a request, attaching the current bearer token when one is held.
    ///
    /// On a 401 the session's refresh runs once and the request is replayed
    /// once with the fresh credential. The retry flag lives on this
    /// request's own stack, so concurrent in-flight requests each get
    /// exactly one retry and never share recovery state.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = config::join_url(self.session.base_url(), path)?;
        let mut retried = false;

        loop {
            let token = self.session.token().await;
            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = token.as_deref() {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(Error::Network)?;
            if response.status().is_success() {
                return Ok(response);
            }

            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();

            if status == 401 && !retried {
                retried = true;
                debug!(path, "Unauthorized - refreshing token and retrying");
                // The stale-token check coalesces concurrent 401s: if another
                // request already rotated the token, this is a no-op and the
                // replay below picks up the fresh credential.
                match self.session.refresh_if_current(token.as_deref()).await {
                    Ok(()) => continue,
                    Err(e) => {
                        warn!(path, "Token refresh failed: {}", e);
                        // clear_local is idempotent; the failing refresh may
                        // already have cleared the session.
                        self.session.clear_local().await;
                        self.hooks.redirect_to_login(LoginRedirect::Plain);
                        return Err(Error::Unauthorized { message });
                    }
                }
            }

            if status == 401 {
                return Err(Error::Unauthorized { message });
            }
            return Err(Error::Api { status, message });
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body, expecting a JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self.request(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// PUT a JSON body, expecting a JSON response.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self.request(Method::PUT, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for AuthHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHttpClient")
            .field("session", &self.session)
            .finish()
    }
}
