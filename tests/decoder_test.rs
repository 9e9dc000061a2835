use argus::error::DecodeError;
use argus::event::{SessionStatus, decode};

const VALID: &str = r#"{
    "station": {"id": 4, "name": "North Gate", "location": "Block C", "numberOfPumps": 6},
    "pump": 3,
    "vehicle": {"id": 11, "make": "BYD", "model": "Atto 3", "plateNumber": "BKV 8821", "batteryCapacity": 60, "owner": {"id": 5}},
    "chargingRate": 11000,
    "sessionId": 77,
    "status": "charging"
}"#;

#[test]
fn valid_frame_decodes() {
    let event = decode(VALID).unwrap();
    assert_eq!(event.session_id, 77);
    assert_eq!(event.status, SessionStatus::Charging);
    assert_eq!(event.station.number_of_pumps, 6);
    assert_eq!(event.owner_id(), Some(5));
}

#[test]
fn truncated_json_yields_malformed_not_panic() {
    let truncated = &VALID[..VALID.len() / 2];
    assert!(matches!(
        decode(truncated),
        Err(DecodeError::Malformed { .. })
    ));
}

#[test]
fn garbage_yields_malformed() {
    for raw in ["", "hello", "\u{0}\u{1}\u{2}", "{", "null"] {
        assert!(decode(raw).is_err(), "input {:?} should not decode", raw);
    }
}

#[test]
fn missing_required_fields_name_the_offender() {
    let cases = [
        (r#"{"pump": 1, "vehicle": {"id": 1}, "chargingRate": 1, "sessionId": 1, "status": "charging"}"#, "station"),
        (r#"{"station": {"id": 1}, "vehicle": {"id": 1}, "chargingRate": 1, "sessionId": 1, "status": "charging"}"#, "pump"),
        (r#"{"station": {"id": 1}, "pump": 1, "chargingRate": 1, "sessionId": 1, "status": "charging"}"#, "vehicle"),
        (r#"{"station": {"id": 1}, "pump": 1, "vehicle": {"id": 1}, "sessionId": 1, "status": "charging"}"#, "chargingRate"),
        (r#"{"station": {"id": 1}, "pump": 1, "vehicle": {"id": 1}, "chargingRate": 1, "status": "charging"}"#, "sessionId"),
        (r#"{"station": {"id": 1}, "pump": 1, "vehicle": {"id": 1}, "chargingRate": 1, "sessionId": 1}"#, "status"),
    ];

    for (raw, expected) in cases {
        match decode(raw) {
            Err(DecodeError::InvalidSchema { field, .. }) => {
                assert_eq!(field, expected, "wrong field for input {}", raw);
            }
            other => panic!("expected InvalidSchema({}) for {}, got {:?}", expected, raw, other),
        }
    }
}

#[test]
fn wrong_status_value_rejected() {
    let raw = VALID.replace("\"charging\"", "\"paused\"");
    match decode(&raw) {
        Err(DecodeError::InvalidSchema { field, detail }) => {
            assert_eq!(field, "status");
            assert!(detail.contains("paused"));
        }
        other => panic!("expected InvalidSchema, got {:?}", other),
    }
}

#[test]
fn negative_and_non_numeric_rates_rejected() {
    let negative = VALID.replace("11000", "-1");
    assert!(matches!(
        decode(&negative),
        Err(DecodeError::InvalidSchema { field, .. }) if field == "chargingRate"
    ));

    let textual = VALID.replace("11000", "\"fast\"");
    assert!(matches!(
        decode(&textual),
        Err(DecodeError::InvalidSchema { field, .. }) if field == "chargingRate"
    ));
}

#[test]
fn decode_is_pure_and_repeatable() {
    let first = decode(VALID).unwrap();
    let second = decode(VALID).unwrap();
    assert_eq!(first, second);
}
