//! # relaynode-server
//!
//! The relay node's cooperative request/registration scheduler.
//!
//! One sequential loop interleaves two unrelated duties: serving the local
//! control API and keeping the hub registration alive. There are no
//! threads and no locks; the only cross-context state is the pair of
//! atomic registration flags in `relaynode-core`.
//!
//! Enable features based on target platform:
//! - `tokio-runtime` (default) - For Linux/desktop
//! - `esp-idf-runtime` - For ESP32 (future)

pub mod routes;
pub mod transport;

#[cfg(feature = "tokio-runtime")]
pub mod registration;
#[cfg(feature = "tokio-runtime")]
pub mod server;
#[cfg(feature = "tokio-runtime")]
pub mod trigger;

pub use routes::dispatch;
pub use transport::TransportError;

#[cfg(feature = "tokio-runtime")]
pub use registration::{RegistrationClient, RegistrationOutcome};
#[cfg(feature = "tokio-runtime")]
pub use server::{RelayServer, ServerConfig};
#[cfg(feature = "tokio-runtime")]
pub use trigger::PeriodicTrigger;
