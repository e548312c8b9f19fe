//! Outbound registration codec.
//!
//! Encoding for the one request the device ever originates (the hub
//! registration POST) and decoding for the one thing it reads back: the
//! status line of the hub's response.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while encoding or decoding hub traffic.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload serialization failed.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The hub response contained no status line.
    #[error("response contained no status line")]
    MissingStatusLine,

    /// The status line did not carry a numeric status code.
    #[error("unparsable status line: {0:?}")]
    MalformedStatusLine(String),
}

/// Encode one registration POST: start line, headers with an exact
/// `Content-Length`, then the JSON payload.
pub fn encode_register_request<T: Serialize>(
    host: &str,
    path: &str,
    payload: &T,
) -> Result<Vec<u8>, CodecError> {
    let body = serde_json::to_vec(payload)?;
    let head = format!(
        "POST {} HTTP/1.0\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        path,
        host,
        body.len()
    );
    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode the status code out of a raw hub response.
pub fn decode_status_code(raw: &[u8]) -> Result<u16, CodecError> {
    let text = String::from_utf8_lossy(raw);
    let status_line = text
        .split("\r\n")
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or(CodecError::MissingStatusLine)?;

    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<u16>().ok())
        .ok_or_else(|| CodecError::MalformedStatusLine(status_line.to_string()))
}

/// Whether a status code counts as a successful registration.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
