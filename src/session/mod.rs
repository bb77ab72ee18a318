//! Session lifecycle: state, transitions, and the idle watchdog.

pub mod manager;
pub mod watchdog;

pub use manager::SessionManager;
pub use watchdog::{ActivityKind, IdleWatchdog, WatchdogConfig};
