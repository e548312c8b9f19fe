//! The main scheduler loop.
//!
//! One sequential loop, two duties. Each iteration services a due
//! registration check first, then waits a short bounded time for one
//! inbound connection and processes it to completion. Neither duty can
//! starve the other: the registration attempt is bounded by its own
//! timeout, and a due check waits at most one accept-wait before it is
//! noticed. Exactly one listening socket exists for the lifetime of the
//! server and exactly one client connection is open at a time.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use relaynode_core::payload::DevicePayload;
use relaynode_core::DeviceContext;
use relaynode_protocol::request::parse_request;
use relaynode_protocol::response::HttpResponse;

use crate::registration::RegistrationClient;
use crate::routes::dispatch;
use crate::transport::TransportError;

/// One receive buffer per request; anything past this is ignored, which
/// is fine because only the start line is ever parsed.
const MAX_REQUEST_BYTES: usize = 1024;

/// Runtime configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the API listener to.
    pub bind_addr: SocketAddr,

    /// Bounded wait for one inbound connection. Also the worst-case
    /// latency before a due registration check is noticed.
    pub accept_wait: Duration,

    /// Deadline for reading one request and writing its response. A slow
    /// client blocks new connections until this expires.
    pub client_timeout: Duration,

    /// How often the periodic trigger looks at the registration flag.
    pub registration_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:80".parse().expect("static address"),
            accept_wait: Duration::from_secs(1),
            client_timeout: Duration::from_secs(10),
            registration_interval: Duration::from_secs(300),
        }
    }
}

/// The relay node's API server and registration scheduler.
pub struct RelayServer {
    config: ServerConfig,
    ctx: DeviceContext,
    registrar: RegistrationClient,
    listener: TcpListener,
    shutdown: Arc<Notify>,
}

impl RelayServer {
    /// Bind the listening socket. Binding is the only fallible part of
    /// server startup, so it is split from [`run`](Self::run).
    pub async fn bind(
        config: ServerConfig,
        ctx: DeviceContext,
        registrar: RegistrationClient,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        Ok(Self {
            config,
            ctx,
            registrar,
            listener,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle used to request a stop from outside the loop.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run until a shutdown is requested, then release the listener and
    /// stop the periodic trigger.
    pub async fn run(self) {
        info!(
            device = %self.ctx.device.name,
            addr = %self.config.bind_addr,
            "relay API serving"
        );

        let trigger = crate::trigger::PeriodicTrigger::start(
            self.config.registration_interval,
            self.ctx.flags.clone(),
        );

        loop {
            // A due registration check is always serviced before a new
            // connection is accepted.
            if self.ctx.flags.take_check_due() {
                debug!("servicing pending registration check");
                let payload = DevicePayload::capture(&self.ctx);
                self.registrar.register(&payload, &self.ctx.flags).await;
            }

            let accepted = tokio::select! {
                _ = self.shutdown.notified() => break,
                accepted = timeout(self.config.accept_wait, self.listener.accept()) => accepted,
            };

            match accepted {
                // Accept wait expired: loop back so the registration flag
                // is re-checked promptly.
                Err(_) => continue,
                Ok(Err(err)) => {
                    let err = TransportError::from(err);
                    if !err.is_idle() {
                        warn!(%err, "accept failed");
                    }
                }
                Ok(Ok((stream, peer))) => {
                    debug!(%peer, "connection accepted");
                    self.serve_client(stream).await;
                }
            }
        }

        trigger.stop();
        drop(self.listener);
        info!("relay server stopped");
    }

    /// Process one client connection to completion.
    ///
    /// The connection is closed on every exit path: the stream is owned
    /// here and dropped when this returns, failure or not.
    async fn serve_client(&self, mut stream: TcpStream) {
        let served = timeout(self.config.client_timeout, self.handle_request(&mut stream)).await;

        let failure = match served {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(TransportError::from(err)),
            Err(_) => Some(TransportError::Timeout),
        };

        if let Some(err) = failure {
            warn!(%err, "request handling failed");
            // Best effort only; if this write fails too, the close below
            // still happens.
            let _ = stream
                .write_all(&HttpResponse::server_error().to_bytes())
                .await;
        }
    }

    /// Read once, parse the start line, dispatch, answer.
    async fn handle_request(&self, stream: &mut TcpStream) -> io::Result<()> {
        let mut buf = vec![0u8; MAX_REQUEST_BYTES];
        let read = stream.read(&mut buf).await?;
        if read == 0 {
            debug!("client disconnected before sending data");
            return Ok(());
        }

        let response = match parse_request(&buf[..read]) {
            Ok(request) => {
                debug!(method = request.method.as_str(), path = %request.path, "request parsed");
                dispatch(&request, &self.ctx)
            }
            Err(err) => {
                warn!(%err, "malformed request line");
                HttpResponse::bad_request()
            }
        };

        stream.write_all(&response.to_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }
}
