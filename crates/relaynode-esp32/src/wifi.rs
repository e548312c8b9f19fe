//! WiFi connection management for ESP32.
//!
//! Brings the station interface up and exposes it as the device's
//! network link.

use std::sync::Mutex;

use anyhow::{bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripheral,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::info;

use relaynode_core::link::NetworkLink;

/// Connect to the configured WiFi network.
///
/// Scans for the target SSID to find its channel, connects with the
/// provided credentials, and waits for a DHCP lease. The returned
/// `EspWifi` must be kept alive for the connection to remain active;
/// wrap it in a [`WifiLink`] to hand it to the device context.
pub fn connect_wifi(
    ssid: &str,
    password: &str,
    modem: impl peripheral::Peripheral<P = esp_idf_svc::hal::modem::Modem> + 'static,
    sysloop: EspSystemEventLoop,
) -> Result<Box<EspWifi<'static>>> {
    if ssid.is_empty() {
        bail!("WiFi SSID cannot be empty");
    }

    let auth_method = if password.is_empty() {
        info!("WiFi password is empty, using open network");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    // Initial configuration for scanning
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;

    info!("Scanning for WiFi networks...");
    let ap_infos = wifi.scan()?;

    let channel = ap_infos.into_iter().find(|ap| ap.ssid == ssid).map(|ap| {
        info!("Found '{}' on channel {}", ssid, ap.channel);
        ap.channel
    });

    if channel.is_none() {
        info!("Network '{}' not found in scan, will try anyway", ssid);
    }

    let ssid = ssid
        .try_into()
        .map_err(|_| anyhow::anyhow!("SSID too long (max 32 chars)"))?;
    let password = password
        .try_into()
        .map_err(|_| anyhow::anyhow!("Password too long (max 64 chars)"))?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid,
        password,
        channel,
        auth_method,
        ..Default::default()
    }))?;

    info!("Connecting WiFi...");
    wifi.connect()?;

    info!("Waiting for DHCP lease...");
    wifi.wait_netif_up()?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi connected, IP address: {}", ip_info.ip);

    Ok(Box::new(esp_wifi))
}

/// The station interface exposed as the device's network link.
///
/// Reads go to the live interface, so the status payload always reflects
/// the connection state at the instant of the call.
pub struct WifiLink {
    wifi: Mutex<Box<EspWifi<'static>>>,
    ssid: String,
}

impl WifiLink {
    pub fn new(wifi: Box<EspWifi<'static>>, ssid: impl Into<String>) -> Self {
        Self {
            wifi: Mutex::new(wifi),
            ssid: ssid.into(),
        }
    }
}

impl NetworkLink for WifiLink {
    fn is_connected(&self) -> bool {
        self.wifi
            .lock()
            .map(|wifi| wifi.is_connected().unwrap_or(false))
            .unwrap_or(false)
    }

    fn ip_address(&self) -> Option<String> {
        let wifi = self.wifi.lock().ok()?;
        let ip_info = wifi.sta_netif().get_ip_info().ok()?;
        let ip = ip_info.ip.to_string();
        if ip == "0.0.0.0" {
            None
        } else {
            Some(ip)
        }
    }

    fn ssid(&self) -> Option<String> {
        if self.is_connected() {
            Some(self.ssid.clone())
        } else {
            None
        }
    }
}
