//! ESP32-specific components for the relay node.
//!
//! This crate provides the hardware implementations of the core
//! capability traits:
//! - WiFi connection management and the [`NetworkLink`] it backs
//! - GPIO relay driver
//!
//! # Architecture
//!
//! The scheduler, routing, and registration logic are platform-agnostic
//! and live in the shared crates; an ESP32 binary wires this crate's
//! implementations into a `DeviceContext` and hands it to the server.
//!
//! [`NetworkLink`]: relaynode_core::link::NetworkLink

pub mod relay;
pub mod wifi;
