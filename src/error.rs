//! Error types for session-gate.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for session-gate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ───────────────────────────────────────────────────────
    /// Login rejected by the server. Carries the server-provided message,
    /// or a generic fallback when the body had none.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Refresh or profile fetch failed - the session has already been cleared
    /// by the time this error reaches the caller.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// A request was rejected mid-flight and the retry budget is exhausted.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message from the server, if any.
        message: String,
    },

    /// No session is held - the operation requires authentication.
    #[error("Not authenticated")]
    NotAuthenticated,

    // ── API ──────────────────────────────────────────────────────────────────
    /// API returned a non-success response other than 401.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    // ── Storage ──────────────────────────────────────────────────────────────
    /// Storage I/O error.
    #[error("Storage I/O error at {path}: {message}")]
    StorageIo {
        /// Path that caused the error.
        path: PathBuf,
        /// Error description.
        message: String,
    },

    /// Storage serialization error.
    #[error("Storage serialization error: {0}")]
    StorageSerialization(String),

    // ── Infrastructure ───────────────────────────────────────────────────────
    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if this error means the user has to log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials(_)
                | Error::SessionExpired(_)
                | Error::Unauthorized { .. }
                | Error::NotAuthenticated
                | Error::Api { status: 401, .. }
        )
    }

    /// Creates a storage I/O error.
    #[must_use]
    pub fn storage_io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StorageIo {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, Error>;
