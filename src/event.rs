//! Charging feed wire types and event decoding
//!
//! The charging feed pushes one JSON session event per text frame. This
//! module defines the typed event model and the pure `decode` entry point
//! that turns a raw frame into a [`SessionEvent`] or a recoverable
//! [`DecodeError`].

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle status carried by a feed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is drawing power
    Charging,
    /// Session finished; the entry leaves the live set
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::Completed => "completed",
        }
    }
}

/// Denormalized station snapshot embedded in each event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub number_of_pumps: u32,
}

/// Owner reference embedded in a vehicle snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

/// Denormalized vehicle snapshot embedded in each event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub id: i64,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub battery_capacity: u32,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
}

/// Identity of one live session: a station's pump occupied by a vehicle.
///
/// Replaces ad hoc `"{station}-{vehicle}-{pump}"` string keys with a typed
/// composite so equality and hashing cannot collide on formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub station_id: i64,
    pub vehicle_id: i64,
    pub pump: u32,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.station_id, self.vehicle_id, self.pump)
    }
}

/// One decoded charging feed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub station: StationInfo,
    pub pump: u32,
    pub vehicle: VehicleInfo,
    /// Instantaneous charging rate in watts
    pub charging_rate: f64,
    /// Server-assigned identifier, stable across events of one session
    pub session_id: i64,
    pub status: SessionStatus,
}

impl SessionEvent {
    /// Dedup key for the live set
    pub fn key(&self) -> SessionKey {
        SessionKey {
            station_id: self.station.id,
            vehicle_id: self.vehicle.id,
            pump: self.pump,
        }
    }

    /// Owning user of the embedded vehicle, if the feed included one
    pub fn owner_id(&self) -> Option<i64> {
        self.vehicle.owner.as_ref().map(|o| o.id)
    }
}

/// Decode a raw feed frame into a [`SessionEvent`].
///
/// Syntactically invalid JSON yields [`DecodeError::Malformed`]; a valid
/// object with a missing or invalid field yields
/// [`DecodeError::InvalidSchema`] naming the offending field. Pure and
/// side-effect-free, so callers decide the recovery policy.
pub fn decode(raw: &str) -> std::result::Result<SessionEvent, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::malformed(e.to_string()))?;

    let obj = value
        .as_object()
        .ok_or_else(|| DecodeError::malformed("frame is not a JSON object"))?;

    let station: StationInfo = required_struct(obj, "station")?;
    let vehicle: VehicleInfo = required_struct(obj, "vehicle")?;

    let pump = obj
        .get("pump")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            DecodeError::invalid_schema("pump", "missing or not a non-negative integer")
        })?;

    let session_id = obj
        .get("sessionId")
        .and_then(Value::as_i64)
        .ok_or_else(|| DecodeError::invalid_schema("sessionId", "missing or not an integer"))?;

    let charging_rate = obj
        .get("chargingRate")
        .and_then(Value::as_f64)
        .ok_or_else(|| DecodeError::invalid_schema("chargingRate", "missing or not numeric"))?;
    if charging_rate < 0.0 || !charging_rate.is_finite() {
        return Err(DecodeError::invalid_schema(
            "chargingRate",
            "must be a finite non-negative number",
        ));
    }

    let status = match obj.get("status").and_then(Value::as_str) {
        Some("charging") => SessionStatus::Charging,
        Some("completed") => SessionStatus::Completed,
        Some(other) => {
            return Err(DecodeError::InvalidSchema {
                field: "status".to_string(),
                detail: format!("unknown status '{}'", other),
            });
        }
        None => return Err(DecodeError::invalid_schema("status", "missing or not a string")),
    };

    Ok(SessionEvent {
        station,
        pump,
        vehicle,
        charging_rate,
        session_id,
        status,
    })
}

/// Extract and deserialize a required nested object field
fn required_struct<T: serde::de::DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<T, DecodeError> {
    let value = obj
        .get(field)
        .ok_or_else(|| DecodeError::invalid_schema(field, "missing"))?;
    serde_json::from_value(value.clone()).map_err(|e| DecodeError::InvalidSchema {
        field: field.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(status: &str, rate: f64) -> String {
        format!(
            r#"{{
                "station": {{"id": 1, "name": "Central", "location": "Lot A", "numberOfPumps": 4}},
                "pump": 2,
                "vehicle": {{"id": 3, "make": "Tesla", "model": "Model 3", "plateNumber": "WXY 1234", "batteryCapacity": 75, "owner": {{"id": 9, "name": "Aina"}}}},
                "chargingRate": {rate},
                "sessionId": 42,
                "status": "{status}"
            }}"#
        )
    }

    #[test]
    fn test_decode_charging_event() {
        let event = decode(&frame("charging", 7000.0)).unwrap();
        assert_eq!(event.status, SessionStatus::Charging);
        assert_eq!(event.charging_rate, 7000.0);
        assert_eq!(event.station.name, "Central");
        assert_eq!(event.vehicle.plate_number, "WXY 1234");
        assert_eq!(event.owner_id(), Some(9));
        assert_eq!(
            event.key(),
            SessionKey {
                station_id: 1,
                vehicle_id: 3,
                pump: 2
            }
        );
    }

    #[test]
    fn test_decode_completed_event() {
        let event = decode(&frame("completed", 0.0)).unwrap();
        assert_eq!(event.status, SessionStatus::Completed);
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let raw = r#"{"station": {"id": 1}, "pump""#;
        match decode(raw) {
            Err(DecodeError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_malformed() {
        match decode("[1, 2, 3]") {
            Err(DecodeError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_status_names_the_field() {
        let raw = r#"{
            "station": {"id": 1},
            "pump": 2,
            "vehicle": {"id": 3},
            "chargingRate": 100,
            "sessionId": 42
        }"#;
        match decode(raw) {
            Err(DecodeError::InvalidSchema { field, .. }) => assert_eq!(field, "status"),
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        match decode(&frame("reserved", 100.0)) {
            Err(DecodeError::InvalidSchema { field, .. }) => assert_eq!(field, "status"),
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        match decode(&frame("charging", -5.0)) {
            Err(DecodeError::InvalidSchema { field, .. }) => assert_eq!(field, "chargingRate"),
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_vehicle_id_names_the_field() {
        let raw = r#"{
            "station": {"id": 1},
            "pump": 2,
            "vehicle": {"make": "Tesla"},
            "chargingRate": 100,
            "sessionId": 42,
            "status": "charging"
        }"#;
        match decode(raw) {
            Err(DecodeError::InvalidSchema { field, .. }) => assert_eq!(field, "vehicle"),
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_key_display() {
        let key = SessionKey {
            station_id: 1,
            vehicle_id: 3,
            pump: 2,
        };
        assert_eq!(key.to_string(), "1-3-2");
    }
}
