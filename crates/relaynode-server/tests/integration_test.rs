//! Integration tests for the relay node server.
//!
//! These boot an actual server on an ephemeral port and drive it with raw
//! HTTP/1.0 clients over TCP, with a scripted listener standing in for
//! the coordinator hub.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use relaynode_core::config::{ActiveLevel, DeviceConfig, HubConfig};
use relaynode_core::driver::SimulatedRelay;
use relaynode_core::flags::RegistrationFlags;
use relaynode_core::link::StaticLink;
use relaynode_core::DeviceContext;
use relaynode_server::{RegistrationClient, RelayServer, ServerConfig};

fn test_context(link: StaticLink) -> DeviceContext {
    DeviceContext {
        device: DeviceConfig {
            name: "test-node".to_string(),
            device_type: "relay".to_string(),
            relay_pin: 15,
            active_level: ActiveLevel::High,
        },
        relay: Arc::new(SimulatedRelay::new(ActiveLevel::High)),
        link: Arc::new(link),
        flags: Arc::new(RegistrationFlags::default()),
    }
}

fn hub_config(addr: SocketAddr) -> HubConfig {
    HubConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout_secs: 2,
        check_interval_secs: 1,
        ..HubConfig::default()
    }
}

/// An unroutable hub config for tests that never register.
fn no_hub() -> HubConfig {
    HubConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        timeout_secs: 1,
        ..HubConfig::default()
    }
}

/// Start a test server; returns its address, shutdown handle, and task.
async fn start_server(
    ctx: DeviceContext,
    hub: HubConfig,
    registration_interval: Duration,
) -> (SocketAddr, Arc<Notify>, JoinHandle<()>) {
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        accept_wait: Duration::from_millis(100),
        client_timeout: Duration::from_secs(2),
        registration_interval,
    };

    let server = RelayServer::bind(config, ctx, RegistrationClient::new(&hub))
        .await
        .expect("bind test server");
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(server.run());

    (addr, shutdown, handle)
}

/// A scripted hub that answers every registration with a fixed response
/// and counts connections.
async fn spawn_hub(response: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    (addr, hits)
}

/// Send raw bytes, read the whole response (the server always closes).
async fn send_request(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect to server");
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("server should close the connection")
        .unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn body_json(response: &str) -> serde_json::Value {
    let body = response
        .split("\r\n\r\n")
        .nth(1)
        .expect("response has a body");
    serde_json::from_str(body).expect("body is valid JSON")
}

#[tokio::test]
async fn index_page_renders() {
    let ctx = test_context(StaticLink::up("10.0.0.9", Some("workshop".to_string())));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let response = send_request(addr, "GET / HTTP/1.0\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html"));
    assert!(response.contains("Connection: close"));
    assert!(response.contains("test-node"));
    assert!(response.contains("10.0.0.9"));

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn relay_on_twice_is_idempotent() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let relay = ctx.relay.clone();
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let first = send_request(addr, "GET /relay/on HTTP/1.0\r\n\r\n").await;
    let second = send_request(addr, "GET /relay/on HTTP/1.0\r\n\r\n").await;

    assert!(first.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body_json(&first), body_json(&second));
    assert_eq!(body_json(&first)["relay_state"], "ON");
    assert_eq!(relay.level().unwrap(), 1);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn off_then_on_then_status_reports_on() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let off = send_request(addr, "POST /relay/off HTTP/1.0\r\n\r\n").await;
    assert_eq!(body_json(&off)["relay_state"], "OFF");

    let on = send_request(addr, "POST /relay/on HTTP/1.0\r\n\r\n").await;
    assert_eq!(body_json(&on)["relay_state"], "ON");

    let status = send_request(addr, "GET /status HTTP/1.0\r\n\r\n").await;
    let body = body_json(&status);
    assert_eq!(body["relay_state"], "ON");
    assert_eq!(body["pin_value"], 1);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn boot_without_network_reports_offline_status() {
    let ctx = test_context(StaticLink::down());
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let status = send_request(addr, "GET /status HTTP/1.0\r\n\r\n").await;
    assert!(status.starts_with("HTTP/1.0 200 OK\r\n"));

    let body = body_json(&status);
    assert_eq!(body["wifi_connected"], false);
    assert_eq!(body["ip_address"], "N/A");
    assert!(body["wifi_ssid"].is_null());
    assert_eq!(body["hub_registered"], false);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn unknown_path_is_404_with_body() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let response = send_request(addr, "GET /relay/toggle HTTP/1.0\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(response.ends_with("Not Found"));

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn unknown_method_is_405() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let response = send_request(addr, "DELETE /status HTTP/1.0\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 405 Method Not Allowed\r\n"));

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn malformed_start_line_is_400() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    let response = send_request(addr, "GARBAGE\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 400 Bad Request\r\n"));

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn periodic_trigger_registers_with_hub() {
    // Scenario: the hub answers 201 Created; after one trigger period the
    // device must show up as registered.
    let (hub_addr, hits) = spawn_hub("HTTP/1.0 201 Created\r\nContent-Length: 0\r\n\r\n").await;

    let ctx = test_context(StaticLink::up("127.0.0.1", None));
    let (addr, shutdown, handle) =
        start_server(ctx, hub_config(hub_addr), Duration::from_millis(200)).await;

    // Wait out at least one trigger period plus one accept wait.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let status = send_request(addr, "GET /status HTTP/1.0\r\n\r\n").await;
    assert_eq!(body_json(&status)["hub_registered"], true);
    assert!(hits.load(Ordering::SeqCst) >= 1);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn rejected_registration_leaves_device_unregistered() {
    let (hub_addr, hits) =
        spawn_hub("HTTP/1.0 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n").await;

    let ctx = test_context(StaticLink::up("127.0.0.1", None));
    let (addr, shutdown, handle) =
        start_server(ctx, hub_config(hub_addr), Duration::from_millis(200)).await;

    tokio::time::sleep(Duration::from_millis(600)).await;

    let status = send_request(addr, "GET /status HTTP/1.0\r\n\r\n").await;
    assert_eq!(body_json(&status)["hub_registered"], false);
    // The device kept trying: every failed attempt re-arms the trigger.
    assert!(hits.load(Ordering::SeqCst) >= 1);

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn registered_device_stops_contacting_the_hub() {
    // Scenario: once registered, trigger firings must not produce
    // registration attempts.
    let (hub_addr, hits) = spawn_hub("HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n").await;

    let ctx = test_context(StaticLink::up("127.0.0.1", None));
    let flags = ctx.flags.clone();
    flags.set_registered(true);

    let (_addr, shutdown, handle) =
        start_server(ctx, hub_config(hub_addr), Duration::from_millis(100)).await;

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!flags.check_pending());

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn server_survives_a_client_that_sends_nothing() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    // Connect and immediately hang up.
    drop(TcpStream::connect(addr).await.unwrap());

    // The next request is served normally.
    let response = send_request(addr, "GET /status HTTP/1.0\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));

    shutdown.notify_one();
    handle.await.unwrap();
}

#[tokio::test]
async fn shutdown_releases_the_listener() {
    let ctx = test_context(StaticLink::up("10.0.0.9", None));
    let (addr, shutdown, handle) = start_server(ctx, no_hub(), Duration::from_secs(60)).await;

    shutdown.notify_one();
    handle.await.unwrap();

    // The port is free again once the loop has exited.
    let rebound = TcpListener::bind(addr).await;
    assert!(rebound.is_ok());
}
