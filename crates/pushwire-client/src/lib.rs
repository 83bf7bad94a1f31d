//! pushwire client library entry.
//!
//! This crate wires the config loader, endpoint, websocket transport,
//! keepalive, event router and lifecycle controller into one stream client.
//! It is consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod keepalive;
pub mod transport;

pub use client::{Client, ConnState};
pub use dispatch::EventStreams;
pub use endpoint::Endpoint;
