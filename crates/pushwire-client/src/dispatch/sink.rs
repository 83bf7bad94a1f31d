//! Output ports for typed events.

use async_trait::async_trait;
use tokio::sync::mpsc;

use pushwire_core::error::PushError;
use pushwire_core::protocol::{
    CommandEvent, EventKind, PriceUpdateEvent, ReservationEvent, SpaceEvent,
};

/// Capacity of every output queue. Delivery waits for the consumer.
pub const QUEUE_CAPACITY: usize = 1;

/// Outcome of handing an event to a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Nobody consumes this port any more.
    NoSubscriber,
}

/// One method per event variant.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Whether a consumer is attached for `kind`. Unsubscribed kinds are not decoded.
    fn accepts(&self, kind: &EventKind) -> bool;

    async fn command(&self, ev: CommandEvent) -> Delivery;
    async fn reservation(&self, ev: ReservationEvent) -> Delivery;
    async fn space(&self, ev: SpaceEvent) -> Delivery;
    async fn price_update(&self, ev: PriceUpdateEvent) -> Delivery;
}

/// Read halves handed to consumers.
#[derive(Debug)]
pub struct EventStreams {
    pub commands: mpsc::Receiver<CommandEvent>,
    pub reservations: mpsc::Receiver<ReservationEvent>,
    pub spaces: mpsc::Receiver<SpaceEvent>,
    pub price_updates: mpsc::Receiver<PriceUpdateEvent>,
    /// Terminal errors of the read and keepalive loops.
    pub errors: mpsc::Receiver<PushError>,
}

/// Channel-backed sink; the client keeps the only senders.
#[derive(Clone)]
pub struct QueueSink {
    commands: mpsc::Sender<CommandEvent>,
    reservations: mpsc::Sender<ReservationEvent>,
    spaces: mpsc::Sender<SpaceEvent>,
    price_updates: mpsc::Sender<PriceUpdateEvent>,
}

/// Build the sink, its error sender and the consumer side.
pub fn queues() -> (QueueSink, mpsc::Sender<PushError>, EventStreams) {
    let (commands_tx, commands) = mpsc::channel(QUEUE_CAPACITY);
    let (reservations_tx, reservations) = mpsc::channel(QUEUE_CAPACITY);
    let (spaces_tx, spaces) = mpsc::channel(QUEUE_CAPACITY);
    let (price_updates_tx, price_updates) = mpsc::channel(QUEUE_CAPACITY);
    let (errors_tx, errors) = mpsc::channel(QUEUE_CAPACITY);

    let sink = QueueSink {
        commands: commands_tx,
        reservations: reservations_tx,
        spaces: spaces_tx,
        price_updates: price_updates_tx,
    };
    let streams = EventStreams {
        commands,
        reservations,
        spaces,
        price_updates,
        errors,
    };
    (sink, errors_tx, streams)
}

async fn deliver<T>(tx: &mpsc::Sender<T>, ev: T) -> Delivery {
    match tx.send(ev).await {
        Ok(()) => Delivery::Delivered,
        Err(_) => Delivery::NoSubscriber,
    }
}

#[async_trait]
impl EventSink for QueueSink {
    fn accepts(&self, kind: &EventKind) -> bool {
        match kind {
            EventKind::DeviceCommand => !self.commands.is_closed(),
            EventKind::Reservation => !self.reservations.is_closed(),
            EventKind::Space => !self.spaces.is_closed(),
            EventKind::PriceUpdate => !self.price_updates.is_closed(),
            EventKind::Other(_) => false,
        }
    }

    async fn command(&self, ev: CommandEvent) -> Delivery {
        deliver(&self.commands, ev).await
    }

    async fn reservation(&self, ev: ReservationEvent) -> Delivery {
        deliver(&self.reservations, ev).await
    }

    async fn space(&self, ev: SpaceEvent) -> Delivery {
        deliver(&self.spaces, ev).await
    }

    async fn price_update(&self, ev: PriceUpdateEvent) -> Delivery {
        deliver(&self.price_updates, ev).await
    }
}
