//! Cross-context registration flags.
//!
//! These two booleans are the only state shared between the periodic
//! trigger context and the scheduler loop. The trigger may read
//! `registered` and set `check_due`; the loop clears `check_due` with a
//! swap and writes `registered` after each attempt. Keeping the shared
//! surface to two atomics is what lets the rest of the device state stay
//! single-owner and lock-free.

use std::sync::atomic::{AtomicBool, Ordering};

/// Registration state shared between the trigger and the scheduler.
#[derive(Debug, Default)]
pub struct RegistrationFlags {
    registered: AtomicBool,
    check_due: AtomicBool,
}

impl RegistrationFlags {
    /// Whether the device currently believes it is registered with the hub.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Record the outcome of a registration attempt.
    pub fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::SeqCst);
    }

    /// Mark a registration check as due. Called from the trigger context;
    /// must stay O(1) and allocation-free.
    pub fn request_check(&self) {
        self.check_due.store(true, Ordering::SeqCst);
    }

    /// Consume a due registration check, clearing it. At most one caller
    /// observes `true` per trigger firing.
    pub fn take_check_due(&self) -> bool {
        self.check_due.swap(false, Ordering::SeqCst)
    }

    /// Whether a check is pending, without consuming it.
    pub fn check_pending(&self) -> bool {
        self.check_due.load(Ordering::SeqCst)
    }
}
