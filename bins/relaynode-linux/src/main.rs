use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use relaynode_core::config::{Config, ConfigError};
use relaynode_core::driver::SimulatedRelay;
use relaynode_core::link::NetworkLink;
use relaynode_core::payload::DevicePayload;
use relaynode_core::{DeviceContext, RegistrationFlags};
use relaynode_server::{RegistrationClient, RelayServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Network link backed by the host's default route.
///
/// Probed once at startup: the configuration surface is static, and the
/// original device re-resolves connectivity only by rebooting.
struct HostLink {
    addr: Option<IpAddr>,
    ssid: Option<String>,
}

impl HostLink {
    fn probe(ssid: Option<String>) -> Self {
        let addr = local_address();
        Self { addr, ssid }
    }
}

impl NetworkLink for HostLink {
    fn is_connected(&self) -> bool {
        self.addr.is_some()
    }

    fn ip_address(&self) -> Option<String> {
        self.addr.map(|addr| addr.to_string())
    }

    fn ssid(&self) -> Option<String> {
        if self.addr.is_some() {
            self.ssid.clone()
        } else {
            None
        }
    }
}

/// Which local address the default route would use. No packets are sent;
/// connecting a UDP socket just selects a source address.
fn local_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,relaynode_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "relaynode.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::NotFound(path)) => {
            tracing::info!(%path, "no config file, using defaults");
            Config::default()
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        device = %config.device.name,
        pin = config.device.relay_pin,
        "relay node starting"
    );

    // Relay starts OFF, matching hardware bring-up.
    let relay = Arc::new(SimulatedRelay::new(config.device.active_level));

    let ssid = (!config.wifi.ssid.is_empty()).then(|| config.wifi.ssid.clone());
    let link = HostLink::probe(ssid);
    match link.ip_address() {
        Some(addr) => tracing::info!(%addr, "network link is up"),
        None => tracing::warn!("no network link; registration will be skipped"),
    }

    let flags = Arc::new(RegistrationFlags::default());
    let ctx = DeviceContext {
        device: config.device.clone(),
        relay,
        link: Arc::new(link),
        flags: flags.clone(),
    };

    // One immediate registration attempt at boot, before the scheduler
    // takes over; afterwards the periodic trigger drives retries.
    let registrar = RegistrationClient::new(&config.hub);
    let payload = DevicePayload::capture(&ctx);
    registrar.register(&payload, &flags).await;

    let server_config = ServerConfig {
        bind_addr: SocketAddr::from(([0, 0, 0, 0], config.server.port)),
        accept_wait: Duration::from_millis(config.server.accept_wait_ms),
        client_timeout: Duration::from_secs(config.server.client_timeout_secs),
        registration_interval: Duration::from_secs(config.hub.check_interval_secs),
    };

    let server = RelayServer::bind(server_config, ctx, registrar).await?;
    tracing::info!(addr = %server.local_addr()?, "relay API ready");
    tracing::info!("Try these commands:");
    tracing::info!("   curl http://localhost:{}/status", config.server.port);
    tracing::info!("   curl http://localhost:{}/relay/on", config.server.port);

    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(server.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, shutting down...");
    shutdown.notify_one();
    handle.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
