//! Network link capability.
//!
//! The link manager owns connectivity; everything else only observes it.
//! On hardware this wraps the WiFi station interface, on the host it is a
//! probe of the default route, and in tests it is a fixed snapshot.

/// Observable state of the device's network link.
pub trait NetworkLink: Send + Sync {
    /// Whether the link is currently up.
    fn is_connected(&self) -> bool;

    /// The address assigned to this device, if any.
    fn ip_address(&self) -> Option<String>;

    /// The SSID of the network the link is associated with, if any.
    fn ssid(&self) -> Option<String>;
}

/// A link with fixed state, for the host binary's fallback and for tests.
#[derive(Debug, Clone)]
pub struct StaticLink {
    connected: bool,
    ip: Option<String>,
    ssid: Option<String>,
}

impl StaticLink {
    /// A link that is up with the given address.
    pub fn up(ip: impl Into<String>, ssid: Option<String>) -> Self {
        Self {
            connected: true,
            ip: Some(ip.into()),
            ssid,
        }
    }

    /// A link that never came up.
    pub fn down() -> Self {
        Self {
            connected: false,
            ip: None,
            ssid: None,
        }
    }
}

impl NetworkLink for StaticLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn ip_address(&self) -> Option<String> {
        self.ip.clone()
    }

    fn ssid(&self) -> Option<String> {
        self.ssid.clone()
    }
}
