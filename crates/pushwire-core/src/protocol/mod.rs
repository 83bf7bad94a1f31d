//! Connector push protocol.
//!
//! Inbound frames are decoded in two passes:
//! - Envelope: the frame's `Events` array is split into raw sub-messages
//!   (`RawValue`, nothing below the array is parsed yet).
//! - Header: each sub-message yields only `Type`/`Id`/`State`, which is all
//!   the router needs to pick a typed decode path.
//!
//! Kind-specific fields are decoded into the types in [`event`] only once the
//! kind is known. All decoders are panic-free and report `PushError::Decode`.

pub mod envelope;
pub mod event;

pub use envelope::{decode_envelope, decode_header, Envelope, EventKind, RoutingHeader};
pub use event::{
    decode_event, CommandEvent, CommandState, PriceUpdateEvent, ReservationEvent,
    ReservationState, SpaceEvent, SpaceState,
};
