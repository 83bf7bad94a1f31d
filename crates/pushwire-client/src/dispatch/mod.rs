//! Event demultiplexing.
//!
//! Re-exports the router and the output ports so downstream consumers can
//! depend on this module directly.

pub mod router;
pub mod sink;

pub use router::{Routed, Router};
pub use sink::{queues, Delivery, EventSink, EventStreams, QueueSink, QUEUE_CAPACITY};
