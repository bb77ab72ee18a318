//! Configuration constants and URL helpers for the session API.

use std::time::Duration;

/// Default API base URL when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Token refresh endpoint path.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Current-user profile endpoint path.
pub const PROFILE_PATH: &str = "/api/v1/me";

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request timeout for HTTP requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Inactivity window after which the session is forcibly terminated.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Lead time before forced logout at which the expiry warning is raised.
pub const IDLE_WARNING_LEAD: Duration = Duration::from_secs(5 * 60);

/// Minimum spacing between watchdog rearms. Activity signals arriving
/// closer together than this are ignored to bound timer churn.
pub const ACTIVITY_DEBOUNCE: Duration = Duration::from_secs(60);

/// Generic message shown when a login failure body carries no `error` field.
pub const LOGIN_FAILED_FALLBACK: &str = "Login failed";

/// Validate a base URL and join a path onto it.
///
/// The base must be an absolute http(s) URL without a trailing slash
/// requirement; the path must start with `/`.
pub fn join_url(base: &str, path: &str) -> Result<String, crate::error::Error> {
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(crate::error::Error::Config(format!(
            "Invalid base URL: '{}' (expected http:// or https://)",
            base
        )));
    }
    if !path.starts_with('/') {
        return Err(crate::error::Error::Config(format!(
            "Invalid API path: '{}' (expected leading '/')",
            path
        )));
    }
    Ok(format!("{}{}", base.trim_end_matches('/'), path))
}
