//! Session history bounds and repeat suppression.

use medcalc_engine::history::{CalculationEvent, History, SessionHistory};
use uuid::Uuid;

#[test]
fn consecutive_repeats_are_dropped() {
    let history = SessionHistory::new(10);
    let instance = Uuid::new_v4();
    history.record(CalculationEvent::new("bmi", instance, "BMI: 22.9"));
    history.record(CalculationEvent::new("bmi", instance, "BMI: 22.9"));
    history.record(CalculationEvent::new("bmi", instance, "BMI: 23.2"));
    history.record(CalculationEvent::new("bmi", instance, "BMI: 22.9"));

    let summaries: Vec<String> = history.recent().into_iter().map(|e| e.summary).collect();
    assert_eq!(summaries, vec!["BMI: 22.9", "BMI: 23.2", "BMI: 22.9"]);
}

#[test]
fn same_result_in_another_fragment_is_kept() {
    let history = SessionHistory::new(10);
    history.record(CalculationEvent::new("bmi", Uuid::new_v4(), "BMI: 22.9"));
    history.record(CalculationEvent::new("bmi", Uuid::new_v4(), "BMI: 22.9"));
    assert_eq!(history.recent().len(), 2);
}

#[test]
fn oldest_events_are_evicted_past_the_limit() {
    let history = SessionHistory::new(3);
    let instance = Uuid::new_v4();
    for total in 0..5 {
        history.record(
            CalculationEvent::new("score", instance, format!("Total Score: {total}"))
                .with_score(Some(total as f64)),
        );
    }
    let scores: Vec<Option<f64>> = history.recent().into_iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn event_serializes_for_hosts() {
    let event = CalculationEvent::new("bmi", Uuid::new_v4(), "BMI: 22.9").with_score(Some(22.9));
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["calculator"], "bmi");
    assert_eq!(json["score"], 22.9);
    assert!(json["at"].is_string());
}
