//! # relaynode-core
//!
//! Core relay device model and capability traits.
//!
//! This crate provides:
//! - Static configuration types (device, wifi, hub, listener)
//! - The cross-context registration flags
//! - Capability traits for the relay line and the network link
//! - The status payload builder
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod config;
pub mod context;
pub mod driver;
pub mod flags;
pub mod link;
pub mod mem;
pub mod payload;

pub use config::{ActiveLevel, Config, ConfigError, DeviceConfig, HubConfig, ListenConfig, WifiConfig};
pub use context::DeviceContext;
pub use driver::{DriverError, RelayDriver, RelayState, SimulatedRelay};
pub use flags::RegistrationFlags;
pub use link::{NetworkLink, StaticLink};
pub use payload::{DegradedPayload, DevicePayload, StatusPayload, NO_ADDRESS};
