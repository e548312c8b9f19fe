//! Request routing and handlers.
//!
//! Routing is an exact match on `(method, path)`, case-sensitive. GET and
//! POST share the relay endpoints; `/` and `/status` are GET-only. Any
//! other method earns a 405, any other path a 404. Relay handlers confirm
//! a transition by reading the line back instead of assuming the write
//! took effect.

use serde_json::json;
use tracing::{error, info, warn};

use relaynode_core::driver::RelayState;
use relaynode_core::mem;
use relaynode_core::payload::{DevicePayload, NO_ADDRESS};
use relaynode_core::DeviceContext;
use relaynode_protocol::request::{HttpRequest, Method};
use relaynode_protocol::response::HttpResponse;

/// Route one parsed request to its handler.
pub fn dispatch(request: &HttpRequest, ctx: &DeviceContext) -> HttpResponse {
    match (&request.method, request.path.as_str()) {
        (Method::Get, "/") => index(ctx),
        (Method::Get | Method::Post, "/relay/on") => set_relay(ctx, true),
        (Method::Get | Method::Post, "/relay/off") => set_relay(ctx, false),
        (Method::Get, "/status") => status(ctx),
        (Method::Get | Method::Post, _) => HttpResponse::not_found(),
        (Method::Other(_), _) => HttpResponse::method_not_allowed(),
    }
}

/// Drive the relay and confirm the transition from the line itself.
fn set_relay(ctx: &DeviceContext, on: bool) -> HttpResponse {
    let wanted = if on { RelayState::On } else { RelayState::Off };

    let confirmed = ctx
        .relay
        .set_state(on)
        .and_then(|()| ctx.relay.level())
        .map(|level| RelayState::from_level(level, ctx.device.active_level));

    match confirmed {
        Ok(state) if state == wanted => {
            info!(
                pin = ctx.device.relay_pin,
                device = %ctx.device.name,
                "relay turned {}",
                state.as_str()
            );
            HttpResponse::json(
                200,
                &json!({
                    "status": "success",
                    "relay_state": state.as_str(),
                    "device_name": ctx.device.name,
                }),
            )
        }
        Ok(state) => {
            error!(
                pin = ctx.device.relay_pin,
                "relay readback reports {} after driving {}",
                state.as_str(),
                wanted.as_str()
            );
            HttpResponse::json(
                500,
                &json!({
                    "status": "error",
                    "message": format!(
                        "relay did not reach {}: line reports {}",
                        wanted.as_str(),
                        state.as_str()
                    ),
                    "device_name": ctx.device.name,
                }),
            )
        }
        Err(err) => {
            error!(pin = ctx.device.relay_pin, %err, "relay driver failure");
            HttpResponse::json(
                500,
                &json!({
                    "status": "error",
                    "message": err.to_string(),
                    "device_name": ctx.device.name,
                }),
            )
        }
    }
}

/// Full status snapshot. Degrades to the minimal error payload rather
/// than ever answering with an empty body.
fn status(ctx: &DeviceContext) -> HttpResponse {
    let payload = DevicePayload::capture(ctx);
    if payload.is_degraded() {
        warn!(device = %ctx.device.name, "reporting degraded status payload");
        HttpResponse::json(500, &payload)
    } else {
        HttpResponse::json(200, &payload)
    }
}

/// Human-facing index page.
fn index(ctx: &DeviceContext) -> HttpResponse {
    let address = ctx
        .link
        .ip_address()
        .unwrap_or_else(|| NO_ADDRESS.to_string());
    let registration = if ctx.flags.is_registered() {
        "Registered with Hub"
    } else {
        "NOT Registered with Hub"
    };
    let mem_free = mem::free_bytes();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{name} - Relay Control</title></head>
<body>
<h1>{name} - Relay Control</h1>
<p>Server is running on IP: {address}</p>
<p>Relay connected to Pin: {pin}</p>
<p>Status: {registration}</p>
<p>Free Memory: {mem_free} bytes</p>
<h2>API Endpoints:</h2>
<ul>
    <li><a href="/relay/on" target="_blank">/relay/on</a> (Turn Relay ON)</li>
    <li><a href="/relay/off" target="_blank">/relay/off</a> (Turn Relay OFF)</li>
    <li><a href="/status" target="_blank">/status</a> (Get Current Status)</li>
</ul>
</body></html>"#,
        name = ctx.device.name,
        address = address,
        pin = ctx.device.relay_pin,
        registration = registration,
        mem_free = mem_free,
    );

    HttpResponse::html(html)
}
