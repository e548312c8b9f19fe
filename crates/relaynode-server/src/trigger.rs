//! Periodic registration trigger.
//!
//! A deliberately dumb signal source: at a fixed period it looks at the
//! registration flag and, when the device is unregistered, marks a check
//! as due. The actual registration attempt involves network I/O and
//! allocation, so it is deferred to the scheduler loop; the tick body is
//! one load and at most one store, nothing more. Treat the task as a
//! second thread of control whose entire write surface is that one flag.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use relaynode_core::RegistrationFlags;

/// Handle to the running trigger task.
pub struct PeriodicTrigger {
    handle: JoinHandle<()>,
}

impl PeriodicTrigger {
    /// Start firing every `period`. The first firing happens one full
    /// period after start, not immediately.
    pub fn start(period: Duration, flags: Arc<RegistrationFlags>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick completes immediately; consume it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !flags.is_registered() {
                    debug!("registration lapsed; marking check due");
                    flags.request_check();
                }
            }
        });
        Self { handle }
    }

    /// Stop the trigger. No further checks will be marked due.
    pub fn stop(self) {
        self.handle.abort();
    }
}
