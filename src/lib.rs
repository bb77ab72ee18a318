//! # session-gate
//!
//! Client-side session and authentication lifecycle manager.
//!
//! Owns the bearer token, decides which storage tier it persists to,
//! transparently refreshes it on expiry, and terminates the session after
//! user inactivity.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use session_gate::{Result, SessionClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = SessionClientBuilder::new()
//!         .base_url("https://api.example.com")
//!         .build()
//!         .await?;
//!
//!     // Restored sessions are picked up during build()
//!     if !client.session().is_authenticated().await {
//!         client.session().login("ada@example.com", "hunter2", false).await?;
//!     }
//!
//!     // Arm the idle watchdog (inert for remember-me sessions)
//!     client.watchdog().activate().await;
//!
//!     // Authenticated calls with transparent retry-on-expiry
//!     let me: session_gate::User = client.http().get_json("/api/v1/me").await?;
//!     println!("Logged in as {}", me.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod session;
pub mod storage;
pub mod transport;

// Re-exports for ergonomic usage
pub use client::{SessionClient, SessionClientBuilder};
pub use error::{Error, Result};
pub use hooks::{LoginRedirect, NoopHooks, SessionHooks};
pub use models::auth::{Role, User};
pub use session::{ActivityKind, IdleWatchdog, SessionManager, WatchdogConfig};
pub use storage::{CredentialStore, FileStorage, MemoryStorage, StorageBackend, Tier};
pub use transport::AuthHttpClient;
