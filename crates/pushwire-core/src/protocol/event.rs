//! Typed events (second decode pass).
//!
//! Each type is decoded from the full sub-message once the router knows its
//! kind. State enums accept values they do not know as `Unknown`; a missing
//! or null `Id`/`State` decodes to its default instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::error::{PushError, Result};

/// State of a device command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CommandState {
    Pending,
    Received,
    Processing,
    Processed,
    Cancelled,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// State of a reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ReservationState {
    Enquired,
    Requested,
    Optional,
    Confirmed,
    Started,
    Processed,
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

/// State of a space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SpaceState {
    Dirty,
    Clean,
    Inspected,
    OutOfService,
    OutOfOrder,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A device command changed state.
///
/// Typed events carry no kind field; the type itself says which kind it is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: CommandState,
}

/// A reservation was created or changed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: ReservationState,
    /// Arrival.
    pub start_utc: DateTime<Utc>,
    /// Departure.
    pub end_utc: DateTime<Utc>,
    #[serde(default)]
    pub assigned_space_id: Option<String>,
}

/// A space changed state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpaceEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: SpaceState,
}

/// Prices changed for an interval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceUpdateEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    #[serde(default)]
    pub rate_id: Option<String>,
    #[serde(default)]
    pub space_category_id: Option<String>,
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Decode the full event of a known kind from its raw sub-message.
pub fn decode_event<T>(raw: &RawValue) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(raw.get())
        .map_err(|e| PushError::Decode(format!("invalid event payload: {e}")))
}
