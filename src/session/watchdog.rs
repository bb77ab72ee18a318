//! Idle watchdog: forced logout after user inactivity.
//!
//! Arms a warning timer and a logout timer together, both keyed off a single
//! last-activity instant, and rearms them when qualifying activity is
//! observed. Remembered sessions are exempt and never expire from
//! inactivity.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

use crate::config;
use crate::hooks::{LoginRedirect, SessionHooks};
use crate::session::SessionManager;

/// Timing parameters for the watchdog.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
    /// Time from last activity to forced logout.
    pub timeout: Duration,
    /// How long before forced logout the expiry warning is raised.
    pub warning_lead: Duration,
    /// Minimum spacing between rearms; activity inside this window is
    /// ignored.
    pub debounce: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout: config::IDLE_TIMEOUT,
            warning_lead: config::IDLE_WARNING_LEAD,
            debounce: config::ACTIVITY_DEBOUNCE,
        }
    }
}

impl WatchdogConfig {
    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`IdleWatchdog::new`]. `warning_lead` is
    /// forced below `timeout` so the warning always precedes the logout.
    pub fn validated(mut self) -> Self {
        if self.warning_lead >= self.timeout {
            warn!(
                lead = ?self.warning_lead,
                timeout = ?self.timeout,
                "warning_lead exceeds timeout - clamping"
            );
            self.warning_lead = self.timeout / 2;
        }
        self
    }
}

/// Classes of user-interaction signals the watchdog observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Pointer button press.
    PointerDown,
    /// Key press.
    KeyDown,
    /// Scroll.
    Scroll,
    /// Touch start.
    TouchStart,
    /// Click.
    Click,
}

/// One arming cycle: both timers plus the activity instant they key off.
struct Armed {
    warning: JoinHandle<()>,
    logout: JoinHandle<()>,
    last_activity: Instant,
    generation: u64,
}

struct WatchdogInner {
    armed: Option<Armed>,
    generation: u64,
}

/// Terminates the session after a fixed inactivity window.
///
/// Inert unless the session is authenticated without remember-me. Timers are
/// cancelled and rearmed as a pair - there is never a half-armed state.
pub struct IdleWatchdog {
    session: Arc<SessionManager>,
    hooks: Arc<dyn SessionHooks>,
    config: WatchdogConfig,
    inner: Mutex<WatchdogInner>,
}

impl IdleWatchdog {
    /// Create an inactive watchdog. Call [`activate`](Self::activate) once a
    /// session exists.
    pub fn new(
        session: Arc<SessionManager>,
        hooks: Arc<dyn SessionHooks>,
        config: WatchdogConfig,
    ) -> Self {
        Self {
            session,
            hooks,
            config: config.validated(),
            inner: Mutex::new(WatchdogInner {
                armed: None,
                generation: 0,
            }),
        }
    }

    /// Arm the timers if the session qualifies.
    ///
    /// No-op for unauthenticated or remembered sessions. Rearms from a fresh
    /// last-activity instant when called while already armed.
    pub async fn activate(self: &Arc<Self>) {
        if !self.session.is_authenticated().await || self.session.remember_me().await {
            debug!("Watchdog inert (unauthenticated or remembered session)");
            return;
        }
        let mut inner = self.inner.lock().expect("watchdog lock poisoned");
        Self::cancel_pair(&mut inner);
        self.arm(&mut inner);
    }

    /// Feed an observed user-interaction signal.
    ///
    /// Signals arriving within the debounce window of the last rearm are
    /// ignored. Otherwise both timers are cancelled and rearmed atomically
    /// from a fresh last-activity instant. No-op while inactive.
    pub fn record_activity(self: &Arc<Self>, kind: ActivityKind) {
        let mut inner = self.inner.lock().expect("watchdog lock poisoned");
        let Some(armed) = inner.armed.as_ref() else {
            return;
        };
        if armed.last_activity.elapsed() < self.config.debounce {
            trace!(?kind, "Activity within debounce window - ignored");
            return;
        }
        debug!(?kind, "Activity observed - rearming idle timers");
        Self::cancel_pair(&mut inner);
        self.arm(&mut inner);
    }

    /// Cancel both pending timers and stop observing activity.
    ///
    /// Safe to call at any time, from any state. No timers survive this.
    pub fn deactivate(&self) {
        let mut inner = self.inner.lock().expect("watchdog lock poisoned");
        Self::cancel_pair(&mut inner);
    }

    /// Whether the timers are currently armed.
    pub fn is_armed(&self) -> bool {
        self.inner
            .lock()
            .expect("watchdog lock poisoned")
            .armed
            .is_some()
    }

    fn cancel_pair(inner: &mut WatchdogInner) {
        if let Some(armed) = inner.armed.take() {
            armed.warning.abort();
            armed.logout.abort();
            debug!("Idle timers cancelled");
        }
    }

    /// Spawn the warning/logout pair. Caller holds the lock, so the pair
    /// lands in `inner` before either task can observe it.
    fn arm(self: &Arc<Self>, inner: &mut WatchdogInner) {
        inner.generation += 1;
        let generation = inner.generation;

        let now = Instant::now();
        let warn_at = now + (self.config.timeout - self.config.warning_lead);
        let this = Arc::clone(self);
        let warning = tokio::spawn(async move {
            sleep_until(warn_at).await;
            if this.cycle_is_current(generation) {
                debug!("Session expires soon");
                this.hooks.session_expiring(this.config.warning_lead);
            }
        });

        let logout_at = now + self.config.timeout;
        let this = Arc::clone(self);
        let logout = tokio::spawn(async move {
            sleep_until(logout_at).await;
            // Disarm first: a rearm racing this wakeup wins, and the hooks
            // below run at most once per arming cycle.
            if !this.disarm_if_current(generation) {
                return;
            }
            warn!("Session expired due to inactivity");
            this.session.logout().await;
            this.hooks.redirect_to_login(LoginRedirect::Timeout);
        });

        inner.armed = Some(Armed {
            warning,
            logout,
            last_activity: now,
            generation,
        });
        debug!(timeout = ?self.config.timeout, "Idle timers armed");
    }

    fn cycle_is_current(&self, generation: u64) -> bool {
        self.inner
            .lock()
            .expect("watchdog lock poisoned")
            .armed
            .as_ref()
            .map(|a| a.generation == generation)
            .unwrap_or(false)
    }

    fn disarm_if_current(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock().expect("watchdog lock poisoned");
        match inner.armed.as_ref() {
            Some(armed) if armed.generation == generation => {
                let armed = inner.armed.take().expect("armed checked above");
                armed.warning.abort();
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for IdleWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleWatchdog")
            .field("config", &self.config)
            .field("armed", &self.is_armed())
            .finish()
    }
}
