//! Hub registration client.
//!
//! One best-effort HTTP POST per invocation: open one connection, send
//! once, read one bounded response buffer, close. The whole attempt lives
//! under a single deadline, so a wedged hub can never stall the scheduler
//! for longer than the configured timeout. Failures are not retried here;
//! the next periodic trigger is the retry.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use relaynode_core::config::HubConfig;
use relaynode_core::payload::DevicePayload;
use relaynode_core::RegistrationFlags;
use relaynode_protocol::codec::{decode_status_code, encode_register_request, is_success};

use crate::transport::TransportError;

/// Largest hub response we bother reading; only the status line matters.
const RESPONSE_BUFFER_BYTES: usize = 512;

/// Explicit result of one registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// The hub answered 2xx.
    Registered,
    /// The hub answered, but not with a 2xx.
    Rejected(u16),
    /// No usable address, so no connection was attempted.
    Skipped,
    /// The attempt died in transit.
    Failed(TransportError),
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered)
    }
}

/// Client for the hub's registration endpoint.
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    host: String,
    port: u16,
    path: String,
    timeout: Duration,
}

impl RegistrationClient {
    pub fn new(hub: &HubConfig) -> Self {
        Self {
            host: hub.host.clone(),
            port: hub.port,
            path: hub.path.clone(),
            timeout: Duration::from_secs(hub.timeout_secs),
        }
    }

    /// Perform one registration attempt and record its outcome in the
    /// shared flags.
    ///
    /// If the payload carries no usable address the network call is
    /// skipped outright; success is impossible and the connection attempt
    /// would be wasted. The flag is still forced false in that case.
    pub async fn register(
        &self,
        payload: &DevicePayload,
        flags: &RegistrationFlags,
    ) -> RegistrationOutcome {
        if !payload.has_address() {
            info!("registration skipped: no usable address in payload");
            flags.set_registered(false);
            return RegistrationOutcome::Skipped;
        }

        info!(host = %self.host, port = self.port, path = %self.path, "attempting hub registration");

        let outcome = match timeout(self.timeout, self.attempt(payload)).await {
            Err(_) => RegistrationOutcome::Failed(TransportError::Timeout),
            Ok(Err(err)) => RegistrationOutcome::Failed(err),
            Ok(Ok(status)) if is_success(status) => RegistrationOutcome::Registered,
            Ok(Ok(status)) => RegistrationOutcome::Rejected(status),
        };

        // A real attempt was made, so the flag follows the outcome.
        flags.set_registered(outcome.is_success());

        match &outcome {
            RegistrationOutcome::Registered => info!("hub registration succeeded"),
            RegistrationOutcome::Rejected(status) => {
                warn!(status, "hub rejected registration")
            }
            RegistrationOutcome::Failed(err) => warn!(%err, "hub registration failed"),
            RegistrationOutcome::Skipped => {}
        }

        outcome
    }

    /// One connect/send/read cycle against the hub. The connection is
    /// closed on every path out of here, success and failure alike.
    async fn attempt(&self, payload: &DevicePayload) -> Result<u16, TransportError> {
        let request = encode_register_request(&self.host, &self.path, payload)
            .map_err(|err| TransportError::Other(io::Error::new(io::ErrorKind::InvalidData, err)))?;

        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.write_all(&request).await?;
        debug!(bytes = request.len(), "registration request sent");

        let mut response = [0u8; RESPONSE_BUFFER_BYTES];
        let read = stream.read(&mut response).await?;
        let status = decode_status_code(&response[..read])
            .map_err(|err| TransportError::Other(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        debug!(status, "hub answered");

        Ok(status)
    }
}
