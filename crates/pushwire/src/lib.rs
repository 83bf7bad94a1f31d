//! Top-level facade crate for pushwire.
//!
//! Re-exports the protocol types and the stream client so users can depend on a single crate.

pub mod core {
    pub use pushwire_core::*;
}

pub mod client {
    pub use pushwire_client::*;
}
