//! Inbound request parsing.
//!
//! The device API only routes on `METHOD PATH`, so only the start line is
//! parsed; headers and body bytes are ignored entirely. No request to this
//! API carries a body that must be read.

use thiserror::Error;

/// Errors from request start-line parsing. Every variant is answered with
/// a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The client sent no bytes, or only whitespace.
    #[error("empty request")]
    Empty,

    /// The start line did not contain both a method and a path.
    #[error("malformed start line: {0:?}")]
    MalformedStartLine(String),
}

/// Request method. Only GET and POST are routable; anything else is kept
/// verbatim so the router can answer 405.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(token) => token,
        }
    }
}

/// One parsed inbound request. Ephemeral: owned by a single
/// connection-handling cycle and discarded after the response is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
}

/// Parse the start line out of one received buffer.
///
/// Paths are matched case-sensitively downstream, so no normalization
/// happens here.
pub fn parse_request(raw: &[u8]) -> Result<HttpRequest, ParseError> {
    let text = String::from_utf8_lossy(raw);
    let first_line = text.split("\r\n").next().unwrap_or("");

    let mut tokens = first_line.split_whitespace();
    let method = tokens.next().ok_or(ParseError::Empty)?;
    let path = tokens
        .next()
        .ok_or_else(|| ParseError::MalformedStartLine(first_line.to_string()))?;

    Ok(HttpRequest {
        method: Method::from_token(method),
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_request() {
        let req = parse_request(b"GET /status HTTP/1.0\r\nHost: device\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/status");
    }

    #[test]
    fn parses_post_without_version_token() {
        // Version is never inspected; two tokens are enough.
        let req = parse_request(b"POST /relay/on\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/relay/on");
    }

    #[test]
    fn unknown_method_is_preserved() {
        let req = parse_request(b"DELETE /status HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Other("DELETE".to_string()));
    }

    #[test]
    fn method_matching_is_case_sensitive() {
        let req = parse_request(b"get /status HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.method, Method::Other("get".to_string()));
    }

    #[test]
    fn empty_request_is_rejected() {
        assert_eq!(parse_request(b""), Err(ParseError::Empty));
        assert_eq!(parse_request(b"\r\n\r\n"), Err(ParseError::Empty));
    }

    #[test]
    fn single_token_line_is_rejected() {
        assert!(matches!(
            parse_request(b"GARBAGE\r\n\r\n"),
            Err(ParseError::MalformedStartLine(_))
        ));
    }

    #[test]
    fn ignores_everything_after_the_start_line() {
        let req =
            parse_request(b"GET / HTTP/1.0\r\nX-Junk: \xff\xfe\r\n\r\nsome body").unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/");
    }
}
