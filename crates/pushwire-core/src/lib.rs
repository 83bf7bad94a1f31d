//! pushwire core: transport-agnostic push protocol primitives and error types.
//!
//! This crate defines the wire-level contracts of the connector event stream
//! (envelope, routing header, typed events) and the error surface shared by
//! the client and its consumers. It carries no transport or runtime
//! dependencies so it can be reused by replay tools and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed frames surface as `PushError::Decode` so a garbled envelope
//! ends a read cycle instead of the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{PushError, Result};
