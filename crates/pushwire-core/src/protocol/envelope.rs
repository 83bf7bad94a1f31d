//! Envelope and routing header (first decode pass).
//!
//! The envelope keeps every sub-message as `RawValue` so nothing is committed
//! to a concrete event shape before its `Type` tag has been read.

use std::fmt;

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{PushError, Result};

/// One inbound frame: an ordered list of undecoded sub-messages.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Sub-messages in wire order.
    #[serde(rename = "Events", default)]
    pub events: Vec<Box<RawValue>>,
}

/// Event kind tag (`Type` in JSON).
///
/// Anything outside the known set is kept as `Other` so it can be logged and
/// dropped without failing the frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum EventKind {
    DeviceCommand,
    Reservation,
    Space,
    PriceUpdate,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::DeviceCommand => "DeviceCommand",
            EventKind::Reservation => "Reservation",
            EventKind::Space => "Space",
            EventKind::PriceUpdate => "PriceUpdate",
            EventKind::Other(s) => s,
        }
    }

    /// Whether this kind has a typed decode path.
    pub fn is_known(&self) -> bool {
        !matches!(self, EventKind::Other(_))
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DeviceCommand" => EventKind::DeviceCommand,
            "Reservation" => EventKind::Reservation,
            "Space" => EventKind::Space,
            "PriceUpdate" => EventKind::PriceUpdate,
            _ => EventKind::Other(s),
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::Other(String::new())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal fields of a sub-message needed for dispatch.
#[derive(Debug, Deserialize)]
pub struct RoutingHeader {
    /// Event kind (field name is `Type` in JSON).
    #[serde(rename = "Type", default)]
    pub kind: EventKind,
    /// Identifier of the entity the event is about.
    #[serde(rename = "Id", default)]
    pub id: String,
    /// Kind-dependent state, stored as raw JSON (lazy parsing).
    #[serde(rename = "State", default)]
    pub state: Option<Box<RawValue>>,
}

/// Split a frame into its ordered sub-messages.
pub fn decode_envelope(frame: &[u8]) -> Result<Envelope> {
    let env: Envelope = serde_json::from_slice(frame)
        .map_err(|e| PushError::Decode(format!("invalid envelope json: {e}")))?;
    tracing::trace!(events = env.events.len(), "envelope decoded");
    Ok(env)
}

/// Decode only the routing header of one sub-message.
pub fn decode_header(raw: &RawValue) -> Result<RoutingHeader> {
    serde_json::from_str(raw.get())
        .map_err(|e| PushError::Decode(format!("invalid routing header: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_events_is_empty_envelope() {
        let env = decode_envelope(br#"{}"#).unwrap();
        assert!(env.events.is_empty());
    }

    #[test]
    fn events_keep_wire_order() {
        let env = decode_envelope(br#"{"Events":[{"Id":"1"},{"Id":"2"},{"Id":"3"}]}"#).unwrap();
        let ids: Vec<String> = env
            .events
            .iter()
            .map(|raw| decode_header(raw).unwrap().id)
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn non_object_frame_is_decode_error() {
        let err = decode_envelope(b"[1,2,3]").unwrap_err();
        assert_eq!(err.code().as_str(), "DECODE");
    }

    #[test]
    fn unknown_type_is_kept_as_other() {
        let env = decode_envelope(br#"{"Events":[{"Type":"Bill","Id":"x"}]}"#).unwrap();
        let header = decode_header(&env.events[0]).unwrap();
        assert_eq!(header.kind, EventKind::Other("Bill".into()));
        assert!(!header.kind.is_known());
    }

    #[test]
    fn non_string_type_is_decode_error() {
        let env = decode_envelope(br#"{"Events":[{"Type":7,"Id":"x"}]}"#).unwrap();
        let err = decode_header(&env.events[0]).unwrap_err();
        assert_eq!(err.code().as_str(), "DECODE");
    }

    #[test]
    fn state_stays_raw() {
        let env = decode_envelope(br#"{"Events":[{"Type":"Space","Id":"s","State":"Dirty"}]}"#).unwrap();
        let header = decode_header(&env.events[0]).unwrap();
        assert_eq!(header.kind, EventKind::Space);
        assert_eq!(header.state.unwrap().get(), r#""Dirty""#);
    }
}
