//! Relay line capability.
//!
//! The relay is a single binary output. Implementations differ per
//! platform (GPIO on hardware, an in-memory latch on the host); handlers
//! always confirm a transition by reading the line back rather than
//! assuming the write took effect.

use crate::config::ActiveLevel;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

/// Errors reported by a relay driver.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The underlying hardware access failed.
    #[error("hardware access failed: {0}")]
    Hardware(String),
}

/// Logical relay state derived from the electrical line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    On,
    Off,
    /// The line reports a level that matches neither polarity mapping.
    Unknown,
}

impl RelayState {
    /// Map an electrical level to the logical state for the given polarity.
    pub fn from_level(level: u8, active: ActiveLevel) -> Self {
        if level == active.on_level() {
            RelayState::On
        } else if level == active.off_level() {
            RelayState::Off
        } else {
            RelayState::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayState::On => "ON",
            RelayState::Off => "OFF",
            RelayState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary relay output line.
pub trait RelayDriver: Send + Sync {
    /// Drive the line to the requested logical state.
    fn set_state(&self, on: bool) -> Result<(), DriverError>;

    /// Read back the electrical level currently on the line.
    fn level(&self) -> Result<u8, DriverError>;
}

/// In-memory relay line used on the host and in tests.
///
/// Starts in the OFF state, matching hardware bring-up.
pub struct SimulatedRelay {
    level: AtomicU8,
    active: ActiveLevel,
}

impl SimulatedRelay {
    pub fn new(active: ActiveLevel) -> Self {
        Self {
            level: AtomicU8::new(active.off_level()),
            active,
        }
    }
}

impl RelayDriver for SimulatedRelay {
    fn set_state(&self, on: bool) -> Result<(), DriverError> {
        let level = if on {
            self.active.on_level()
        } else {
            self.active.off_level()
        };
        self.level.store(level, Ordering::SeqCst);
        Ok(())
    }

    fn level(&self) -> Result<u8, DriverError> {
        Ok(self.level.load(Ordering::SeqCst))
    }
}
