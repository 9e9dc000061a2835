use argus::api::types::{SessionRecord, Station, User, Vehicle};
use argus::error::Result;
use argus::event::{SessionEvent, SessionStatus, StationInfo, VehicleInfo};
use argus::history::{HistoryPage, HistoryQuery, SessionHistory, merge_for_display};
use argus::projector::to_history_row;
use argus::reconciler::Reconciler;
use async_trait::async_trait;
use chrono::Utc;

fn user() -> User {
    User {
        id: 9,
        name: "Mira".to_string(),
        email: "mira@example.com".to_string(),
        is_admin: false,
    }
}

fn completed_record(id: i64) -> SessionRecord {
    SessionRecord {
        id,
        user: user(),
        vehicle: Vehicle {
            id,
            make: "Polestar".to_string(),
            model: "2".to_string(),
            plate_number: format!("PS {}", id),
            battery_capacity: 78,
            owner: None,
        },
        station: Station {
            id,
            name: format!("Station {}", id),
            location: "Depot".to_string(),
            number_of_pumps: 2,
        },
        pump_number: 1,
        is_completed: true,
        is_reserved: false,
        is_charging: false,
        start_time: Utc::now(),
    }
}

fn page(content: Vec<SessionRecord>, total_elements: u64, total_pages: u32) -> HistoryPage {
    let count = content.len() as u32;
    HistoryPage {
        content,
        total_elements,
        total_pages,
        size: 5,
        number: 1,
        number_of_elements: count,
        first: true,
        last: total_pages <= 1,
    }
}

fn live_event(session_id: i64) -> SessionEvent {
    SessionEvent {
        station: StationInfo {
            id: session_id,
            name: format!("Station {}", session_id),
            location: "Depot".to_string(),
            number_of_pumps: 2,
        },
        pump: 1,
        vehicle: VehicleInfo {
            id: session_id,
            make: "Polestar".to_string(),
            model: "2".to_string(),
            plate_number: format!("PS {}", session_id),
            battery_capacity: 78,
            owner: None,
        },
        charging_rate: 7000.0,
        session_id,
        status: SessionStatus::Charging,
    }
}

/// Canned history source standing in for the REST client
struct FixturePages {
    page: HistoryPage,
}

#[async_trait]
impl SessionHistory for FixturePages {
    async fn fetch_page(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        query.validate()?;
        Ok(self.page.clone())
    }
}

#[tokio::test]
async fn trait_passthrough_reports_totals_unmodified() {
    let source = FixturePages {
        page: page(vec![completed_record(1), completed_record(2)], 17, 4),
    };

    let fetched = source
        .fetch_page(&HistoryQuery::completed(1, 5))
        .await
        .unwrap();

    assert_eq!(fetched.total_elements, 17);
    assert_eq!(fetched.total_pages, 4);
    assert_eq!(fetched.content.len(), 2);
}

#[tokio::test]
async fn zero_page_is_rejected_by_the_bridge() {
    let source = FixturePages {
        page: page(vec![], 0, 0),
    };
    assert!(source.fetch_page(&HistoryQuery::completed(0, 5)).await.is_err());
}

#[test]
fn live_and_completed_sets_are_disjoint() {
    let mut rec = Reconciler::new();
    let e1 = live_event(101);
    let e2 = live_event(102);
    rec.apply(e1.clone());
    rec.apply(e2);

    // Session 101 completes and shows up in history; 102 is still live
    let mut done = e1;
    done.status = SessionStatus::Completed;
    rec.apply(done);

    let live_ids: Vec<i64> = rec.snapshot().iter().map(|e| e.session_id).collect();
    let history = page(vec![completed_record(101)], 1, 1);
    let history_ids: Vec<i64> = history.content.iter().map(|r| r.id).collect();

    for id in &live_ids {
        assert!(!history_ids.contains(id), "session {} in both sets", id);
    }
}

#[test]
fn merge_never_double_counts_a_session() {
    let mut rec = Reconciler::new();
    rec.apply(live_event(101));
    rec.apply(live_event(102));

    let live_rows: Vec<SessionRecord> = rec
        .entries()
        .iter()
        .map(|s| to_history_row(s, &user()))
        .collect();

    // A stale page still lists 101 even though it is live again
    let stale = page(vec![completed_record(101), completed_record(50)], 2, 1);

    let merged = merge_for_display(&live_rows, &stale);
    assert_eq!(merged.len(), 3);

    let ids: Vec<i64> = merged.iter().map(|r| r.id).collect();
    let unique: std::collections::HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate session in merged view");

    // Live rows come first
    assert!(merged[0].is_charging);
    assert!(merged[1].is_charging);
    assert!(merged[2].is_completed);
}

#[test]
fn page_envelope_parses_spring_shape() {
    let json = r#"{
        "content": [{
            "id": 5,
            "user": {"id": 9, "name": "Mira", "email": "mira@example.com", "isAdmin": false},
            "vehicle": {"id": 3, "make": "Polestar", "model": "2", "plateNumber": "PS 3", "batteryCapacity": 78},
            "station": {"id": 1, "name": "Depot", "location": "Dock 4", "numberOfPumps": 2},
            "pumpNumber": 1,
            "isCompleted": true,
            "isReserved": false,
            "isCharging": false,
            "startTime": "2025-05-20T10:15:00Z"
        }],
        "totalElements": 1,
        "totalPages": 1,
        "size": 10,
        "number": 1,
        "numberOfElements": 1,
        "first": true,
        "last": true
    }"#;

    let parsed: HistoryPage = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.content.len(), 1);
    assert_eq!(parsed.content[0].station.name, "Depot");
    assert!(parsed.content[0].is_completed);
}
