//! # relaynode-protocol
//!
//! Minimal HTTP/1.0 wire handling for the relay node.
//!
//! Only what the device needs: request start-line parsing (headers and
//! bodies are never read), one-shot response rendering with
//! `Connection: close`, and the outbound registration request codec.

pub mod codec;
pub mod request;
pub mod response;

pub use codec::{decode_status_code, encode_register_request, is_success, CodecError};
pub use request::{parse_request, HttpRequest, Method, ParseError};
pub use response::HttpResponse;
