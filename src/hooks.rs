//! Hooks through which the session core notifies the outside world.
//!
//! The warning UI and the route layer live outside this crate; they plug in
//! behind [`SessionHooks`]. Tests use a recording fake.

use std::time::Duration;

/// Where a forced redirect to the login entry point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRedirect {
    /// No special marker - e.g. a mid-session token rejection.
    Plain,
    /// Carries the "timeout" reason marker - idle watchdog expiry.
    Timeout,
}

/// Callbacks invoked by the session core.
///
/// All methods default to no-ops so implementors only override what they
/// consume. Implementations must not block; they are called from async
/// context.
pub trait SessionHooks: Send + Sync {
    /// The session will be forcibly terminated in `remaining` unless
    /// activity occurs. Notification only - no state has changed.
    fn session_expiring(&self, remaining: Duration) {
        let _ = remaining;
    }

    /// The session is gone and the user must be taken to the login entry
    /// point. Local state has already been cleared when this fires.
    fn redirect_to_login(&self, redirect: LoginRedirect) {
        let _ = redirect;
    }
}

/// Hooks implementation that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}
