//! Authentication-related types.

use serde::{Deserialize, Serialize};

/// Role assigned to a user by the server.
///
/// Unknown roles are preserved verbatim so a round trip through storage
/// never rewrites what the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Read-only access.
    Viewer,
    /// Any other role string.
    Other(String),
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Role::Admin,
            "viewer" => Role::Viewer,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "admin".to_string(),
            Role::Viewer => "viewer".to_string(),
            Role::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Assigned role.
    pub role: Role,
}

/// Body sent to the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
    /// Profile of the user that logged in.
    pub user: User,
}

/// Successful token refresh response.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// Replacement bearer token.
    pub token: String,
}

/// Error body returned by the API on failures.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error message.
    #[serde(default)]
    pub error: Option<String>,
}
