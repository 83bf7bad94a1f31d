//! Transport layer (WebSocket client).
//!
//! Exposes the session (dial, split, control frames, liveness deadline) and
//! the codec that maps websocket messages to data frames and control events.

pub mod codec;
pub mod session;

pub use codec::{ControlFrame, Inbound};
pub use session::{ReadOutcome, Session, SessionReader, SessionWriter};
