//! Envelope + typed event vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use pushwire_core::protocol::{
    decode_envelope, decode_event, decode_header, CommandEvent, CommandState, EventKind,
    PriceUpdateEvent, ReservationEvent, ReservationState, SpaceEvent, SpaceState,
};

fn load(name: &str) -> Vec<u8> {
    fs::read(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_reservation_envelope() {
    let env = decode_envelope(&load("envelope_reservation.json")).unwrap();
    assert_eq!(env.events.len(), 1);

    let header = decode_header(&env.events[0]).unwrap();
    assert_eq!(header.kind, EventKind::Reservation);
    assert_eq!(header.id, "a1");

    let ev: ReservationEvent = decode_event(&env.events[0]).unwrap();
    assert_eq!(ev.state, ReservationState::Confirmed);
    assert_eq!(ev.start_utc.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    assert_eq!(ev.end_utc.to_rfc3339(), "2024-01-02T00:00:00+00:00");
    assert_eq!(ev.assigned_space_id.as_deref(), Some("s1"));
}

#[test]
fn parse_mixed_envelope_in_order() {
    let env = decode_envelope(&load("envelope_mixed.json")).unwrap();
    let kinds: Vec<EventKind> = env
        .events
        .iter()
        .map(|raw| decode_header(raw).unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::DeviceCommand,
            EventKind::Reservation,
            EventKind::Space,
            EventKind::PriceUpdate,
            EventKind::Other("Bill".into()),
        ]
    );

    let cmd: CommandEvent = decode_event(&env.events[0]).unwrap();
    assert_eq!(cmd.state, CommandState::Pending);

    let space: SpaceEvent = decode_event(&env.events[2]).unwrap();
    assert_eq!(space.state, SpaceState::Dirty);

    let price: PriceUpdateEvent = decode_event(&env.events[3]).unwrap();
    assert_eq!(price.rate_id.as_deref(), Some("rate-1"));
    assert_eq!(price.space_category_id.as_deref(), Some("cat-2"));
}

#[test]
fn parse_unknown_kind() {
    let env = decode_envelope(&load("envelope_unknown.json")).unwrap();
    let header = decode_header(&env.events[0]).unwrap();
    assert_eq!(header.kind.as_str(), "Unknown");
    assert!(!header.kind.is_known());
}

#[test]
fn truncated_frame_is_rejected() {
    let err = decode_envelope(br#"{"Events":[{"Type":"Space""#).unwrap_err();
    assert_eq!(err.code().as_str(), "DECODE");
}
