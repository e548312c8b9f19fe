//! Outbound response rendering.
//!
//! Every response is HTTP/1.0 with an explicit `Content-Length` and
//! `Connection: close`: one request, one response, one close.

use serde::Serialize;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";

/// One response, pending render. Ephemeral: its lifecycle ends when the
/// rendered bytes are flushed to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A JSON response. If the value cannot be serialized the response
    /// degrades to a plain-text 500 rather than an empty body.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: APPLICATION_JSON,
                body,
            },
            Err(_) => Self::text(500, "Internal Server Error"),
        }
    }

    /// A 200 HTML page.
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: TEXT_HTML,
            body: body.into_bytes(),
        }
    }

    /// A plain-text response.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bad_request() -> Self {
        Self::text(400, "Bad Request")
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "Method Not Allowed")
    }

    pub fn server_error() -> Self {
        Self::text(500, "Internal Server Error")
    }

    /// Render the full response to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.0 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            reason(self.status),
            self.content_type,
            self.body.len()
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
