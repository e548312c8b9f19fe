//! Status payload builder.
//!
//! The payload is a snapshot: device identity plus live reads of the relay
//! line, the network link, the registration flag, and the free-memory
//! metric at the instant of the call. It is never cached across calls.
//!
//! When a live read fails the builder degrades to a minimal error-shaped
//! payload instead of failing; the API never returns an empty body.

use serde::{Deserialize, Serialize};

use crate::context::DeviceContext;
use crate::driver::RelayState;
use crate::mem;

/// Address string reported when the link is down or has no lease.
pub const NO_ADDRESS: &str = "N/A";

/// Full device snapshot, sent to the hub on registration and returned by
/// the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub device_name: String,
    pub device_type: String,
    pub relay_pin: u8,
    pub relay_state: String,
    pub pin_value: u8,
    pub ip_address: String,
    pub wifi_connected: bool,
    /// `null` whenever the link is down.
    pub wifi_ssid: Option<String>,
    pub hub_registered: bool,
    pub mem_free: u64,
}

/// Minimal payload produced when the full snapshot cannot be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedPayload {
    pub device_name: String,
    pub device_type: String,
    pub error: String,
    pub ip_address: String,
    pub wifi_connected: bool,
    pub hub_registered: bool,
    pub mem_free: u64,
}

/// A device payload: the full snapshot, or the degraded fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DevicePayload {
    Status(StatusPayload),
    Degraded(DegradedPayload),
}

impl DevicePayload {
    /// Build a fresh snapshot from live reads of the device capabilities.
    pub fn capture(ctx: &DeviceContext) -> Self {
        let connected = ctx.link.is_connected();
        let ip_address = if connected {
            ctx.link.ip_address().unwrap_or_else(|| NO_ADDRESS.to_string())
        } else {
            NO_ADDRESS.to_string()
        };
        let mem_free = mem::free_bytes();

        match ctx.relay.level() {
            Ok(level) => {
                let state = RelayState::from_level(level, ctx.device.active_level);
                DevicePayload::Status(StatusPayload {
                    device_name: ctx.device.name.clone(),
                    device_type: ctx.device.device_type.clone(),
                    relay_pin: ctx.device.relay_pin,
                    relay_state: state.as_str().to_string(),
                    pin_value: level,
                    ip_address,
                    wifi_connected: connected,
                    wifi_ssid: if connected { ctx.link.ssid() } else { None },
                    hub_registered: ctx.flags.is_registered(),
                    mem_free,
                })
            }
            Err(err) => DevicePayload::Degraded(DegradedPayload {
                device_name: ctx.device.name.clone(),
                device_type: ctx.device.device_type.clone(),
                error: format!("failed to read relay state: {}", err),
                ip_address,
                wifi_connected: connected,
                hub_registered: ctx.flags.is_registered(),
                mem_free,
            }),
        }
    }

    /// The address this payload carries, `"N/A"` when there is none.
    pub fn ip_address(&self) -> &str {
        match self {
            DevicePayload::Status(payload) => &payload.ip_address,
            DevicePayload::Degraded(payload) => &payload.ip_address,
        }
    }

    /// Whether the payload carries a usable address. Registration is
    /// pointless without one.
    pub fn has_address(&self) -> bool {
        !self.ip_address().is_empty() && self.ip_address() != NO_ADDRESS
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DevicePayload::Degraded(_))
    }
}
