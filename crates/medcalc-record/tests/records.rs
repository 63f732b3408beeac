//! In-memory record source, subjects and observation staleness.

use std::time::Duration;

use jiff::civil::date;
use jiff::{SignedDuration, Timestamp};
use medcalc_record::error::RecordError;
use medcalc_record::memory::{InMemoryRecords, RecordBundle};
use medcalc_record::observation::Observation;
use medcalc_record::source::{NoRecords, RecordSource};
use medcalc_record::subject::{Sex, Subject};

fn ts(s: &str) -> Timestamp {
    s.parse().expect("valid timestamp")
}

#[tokio::test]
async fn most_recent_observation_wins() {
    let records = InMemoryRecords::new()
        .with_observation(Observation::new("2160-0", 1.4, Some("mg/dL"), ts("2025-03-01T00:00:00Z")))
        .with_observation(Observation::new("2160-0", 0.9, Some("mg/dL"), ts("2025-06-01T00:00:00Z")))
        .with_observation(Observation::new("2160-0", 2.0, Some("mg/dL"), ts("2024-01-01T00:00:00Z")));

    let found = records.observation("2160-0").await.unwrap().unwrap();
    assert_eq!(found.value, 0.9);
    assert!(records.observation("8480-6").await.unwrap().is_none());
}

#[tokio::test]
async fn condition_lookup_matches_any_code() {
    let records = InMemoryRecords::new().with_condition("38341003");
    let codes = vec!["I10".to_string(), "38341003".to_string()];
    assert!(records.has_condition(&codes).await.unwrap());
    assert!(!records.has_condition(&["E11".to_string()]).await.unwrap());
}

#[tokio::test]
async fn failing_source_reports_unavailable() {
    let records = InMemoryRecords::new().failing("connection reset");
    let err = records.observation("2160-0").await.unwrap_err();
    assert!(matches!(err, RecordError::Unavailable(reason) if reason == "connection reset"));
}

#[tokio::test]
async fn latency_delays_lookups() {
    let records = InMemoryRecords::new().with_latency(Duration::from_millis(40));
    let started = std::time::Instant::now();
    records.observation("x").await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn no_records_is_never_ready() {
    let source = NoRecords;
    assert!(!source.is_ready());
    assert!(source.observation("2160-0").await.unwrap().is_none());
    assert!(!source.has_condition(&["I10".to_string()]).await.unwrap());
}

#[test]
fn staleness_uses_whole_days() {
    let now = ts("2025-06-30T00:00:00Z");
    let recent = Observation::new("x", 1.0, None, now - SignedDuration::from_hours(24 * 90));
    let old = Observation::new("x", 1.0, None, now - SignedDuration::from_hours(24 * 91));
    assert_eq!(recent.age_days(now), 90);
    assert!(!recent.is_stale(now, 90));
    assert!(old.is_stale(now, 90));
}

#[test]
fn age_counts_completed_years() {
    let subject = Subject::new("p1").born(date(1960, 7, 15)).sex(Sex::Female);
    assert_eq!(subject.age_on(date(2025, 7, 14)), Some(64));
    assert_eq!(subject.age_on(date(2025, 7, 15)), Some(65));
    assert_eq!(subject.age_on(date(1950, 1, 1)), None);
    assert_eq!(Subject::new("p2").age_on(date(2025, 1, 1)), None);
}

#[tokio::test]
async fn bundle_round_trips_into_sources() {
    let json = r#"{
        "subject": {"id": "p1", "birth_date": "1950-02-01", "sex": "male"},
        "observations": [
            {"code": "2160-0", "value": 1.1, "unit": "mg/dL", "effective": "2025-05-01T08:00:00Z"}
        ],
        "conditions": ["I10"]
    }"#;
    let (subject, records) = RecordBundle::from_json(json).unwrap().into_parts();
    assert_eq!(subject.sex, Some(Sex::Male));
    assert_eq!(subject.birth_date, Some(date(1950, 2, 1)));
    assert_eq!(records.observation("2160-0").await.unwrap().unwrap().value, 1.1);
    assert!(records.has_condition(&["I10".to_string()]).await.unwrap());
}

#[test]
fn bundle_without_subject_id_is_malformed() {
    let err = RecordBundle::from_json(r#"{"subject": {"id": ""}}"#).unwrap_err();
    assert!(matches!(err, RecordError::Malformed(_)));
}
