use serde_json::value::RawValue;

use pushwire_core::error::Result;
use pushwire_core::protocol::{
    decode_envelope, decode_event, decode_header, EventKind, RoutingHeader,
};

use crate::dispatch::sink::{Delivery, EventSink};

/// What happened to one sub-message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Dispatched,
    Dropped,
}

impl From<Delivery> for Routed {
    fn from(d: Delivery) -> Self {
        match d {
            Delivery::Delivered => Routed::Dispatched,
            Delivery::NoSubscriber => Routed::Dropped,
        }
    }
}

/// Maps routing header kinds to typed decode paths and output ports.
///
/// Device commands are checked on their own. Reservation, space and price
/// update form a priority chain: the first matching kind wins. Kinds outside
/// the known set are dropped without error.
pub struct Router<S> {
    sink: S,
}

impl<S: EventSink> Router<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode a frame and route every sub-message in wire order.
    ///
    /// Returns how many events were delivered. The first malformed header or
    /// malformed known-kind payload aborts the frame; nothing after it is routed.
    pub async fn route_frame(&self, frame: &[u8]) -> Result<usize> {
        let env = decode_envelope(frame)?;
        let mut dispatched = 0;
        for raw in &env.events {
            let header = decode_header(raw)?;
            if self.route(&header, raw).await? == Routed::Dispatched {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// Route one sub-message whose header is already decoded.
    pub async fn route(&self, header: &RoutingHeader, raw: &RawValue) -> Result<Routed> {
        let kind = &header.kind;
        let mut routed = Routed::Dropped;

        if *kind == EventKind::DeviceCommand && self.sink.accepts(kind) {
            routed = self.sink.command(decode_event(raw)?).await.into();
        }

        if *kind == EventKind::Reservation && self.sink.accepts(kind) {
            routed = self.sink.reservation(decode_event(raw)?).await.into();
        } else if *kind == EventKind::Space && self.sink.accepts(kind) {
            routed = self.sink.space(decode_event(raw)?).await.into();
        } else if *kind == EventKind::PriceUpdate && self.sink.accepts(kind) {
            routed = self.sink.price_update(decode_event(raw)?).await.into();
        }

        if routed == Routed::Dropped {
            tracing::debug!(kind = %kind, id = %header.id, "sub-message dropped");
        }
        Ok(routed)
    }
}
