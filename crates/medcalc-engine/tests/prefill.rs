//! Auto-population from the record after attach.

use std::sync::Arc;
use std::time::Duration;

use jiff::civil::date;
use jiff::{SignedDuration, Timestamp};

use medcalc_core::models::input::{
    ChoiceOption, InputSpec, Layout, ObservationRule, SUBJECT_AGE, SUBJECT_SEX,
};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_engine::attach::AttachContext;
use medcalc_engine::compile::Engine;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::error::HookError;
use medcalc_engine::settings::EngineSettings;
use medcalc_record::memory::InMemoryRecords;
use medcalc_record::observation::Observation;
use medcalc_record::subject::{Sex, Subject};

const BODY_WEIGHT: &str = "29463-7";

fn engine() -> Engine {
    Engine::new(EngineSettings::default()).unwrap()
}

fn days_ago(days: i64) -> Timestamp {
    Timestamp::now() - SignedDuration::from_hours(24 * days)
}

fn dose() -> CalculatorConfig {
    let layout = Layout::Inputs(vec![
        InputSpec::number("weight", "Weight")
            .toggle("weight", "kg", &["kg", "lbs"])
            .observation(BODY_WEIGHT),
    ]);
    CalculatorConfig::simple("dose", "Dose", layout, |values| {
        let weight = values.number("weight")?;
        Some(vec![ResultItem::new("Dose", round_to(weight * 2.0, 0)).unit("mg")])
    })
}

#[tokio::test]
async fn observation_is_converted_into_displayed_unit() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().with_observation(Observation::new(
        BODY_WEIGHT,
        154.3,
        Some("lbs"),
        days_ago(3),
    ));

    let attachment =
        unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)));
    assert!(attachment.has_prefill());
    attachment.settled().await;

    assert_eq!(fragment.raw("weight").as_deref(), Some("70.0"));
    assert!(fragment.stale_fields().is_empty());
    let markup = fragment.result_markup().expect("pre-filled value recomputes");
    assert!(markup.contains("140"));
}

#[tokio::test]
async fn old_observation_is_written_and_marked_stale() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().with_observation(Observation::new(
        BODY_WEIGHT,
        82.0,
        Some("kg"),
        days_ago(200),
    ));

    unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)))
        .settled()
        .await;
    assert_eq!(fragment.raw("weight").as_deref(), Some("82.0"));
    assert_eq!(fragment.stale_fields(), vec!["weight".to_string()]);

    fragment.set_value("weight", "80");
    assert!(fragment.stale_fields().is_empty());
}

#[tokio::test]
async fn later_write_wins_and_both_recompute() {
    let engine = engine();
    let unit = engine.compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new()
        .with_observation(Observation::new(BODY_WEIGHT, 70.0, Some("kg"), days_ago(1)))
        .with_latency(Duration::from_millis(50));

    let attachment =
        unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)));
    fragment.set_value("weight", "80");
    assert!(fragment.result_markup().unwrap().contains("160"));

    attachment.settled().await;
    assert_eq!(fragment.raw("weight").as_deref(), Some("70.0"));

    let summaries: Vec<String> = engine
        .history()
        .recent()
        .into_iter()
        .map(|event| event.summary)
        .collect();
    assert_eq!(summaries, vec!["Dose: 160 mg", "Dose: 140 mg"]);
}

#[tokio::test]
async fn dropped_fragment_is_not_written() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let weak = fragment.downgrade();
    let records = InMemoryRecords::new()
        .with_observation(Observation::new(BODY_WEIGHT, 70.0, Some("kg"), days_ago(1)))
        .with_latency(Duration::from_millis(20));

    let attachment =
        unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)));
    drop(fragment);
    attachment.settled().await;
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn unavailable_record_leaves_fields_untouched() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().failing("connection refused");

    unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)))
        .settled()
        .await;
    assert_eq!(fragment.raw("weight"), None);
    assert!(!fragment.is_result_visible());
}

#[tokio::test]
async fn subject_demographics_and_conditions_fill_option_groups() {
    let layout = Layout::Inputs(vec![
        InputSpec::number("age", "Age").unit("years").observation(SUBJECT_AGE),
        InputSpec::radio(
            "sex",
            "Sex",
            vec![
                ChoiceOption::new("male", "Male"),
                ChoiceOption::new("female", "Female"),
            ],
        )
        .observation(SUBJECT_SEX),
        InputSpec::yes_no("elderly", "Age 65 or over", 1.0).map_observation(
            SUBJECT_AGE,
            vec![
                ObservationRule::at_least(65.0, "1"),
                ObservationRule::below_or_equal(64.0, "0"),
            ],
        ),
        InputSpec::checkboxes(
            "history",
            "History",
            vec![
                ChoiceOption::new("1", "Hypertension")
                    .with_id("htn")
                    .when_condition(&["I10"]),
                ChoiceOption::new("1", "Stroke")
                    .with_id("stroke")
                    .when_condition(&["I63"]),
            ],
        ),
    ]);
    let config = CalculatorConfig::score("demographics", "Demographics", layout)
        .tally(|values| Some(values.number("elderly")? + values.checked_total("history")));
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();

    let subject = Subject::new("p-1")
        .born(date(1950, 1, 1))
        .sex(Sex::Female);
    let records = InMemoryRecords::new().with_condition("I10");
    unit.attach(
        AttachContext::new(fragment.clone())
            .with_record(Arc::new(records))
            .with_subject(subject),
    )
    .settled()
    .await;

    let age: f64 = fragment.raw("age").unwrap().parse().unwrap();
    assert!(age >= 75.0);
    assert_eq!(fragment.selected("sex").as_deref(), Some("female"));
    assert_eq!(fragment.selected("elderly").as_deref(), Some("1"));
    assert_eq!(fragment.is_checked("htn"), Some(true));
    assert_eq!(fragment.is_checked("stroke"), Some(false));
    assert_eq!(unit.evaluate(&fragment).unwrap().score(), Some(2.0));
}

#[tokio::test]
async fn custom_hook_runs_after_declarative_pass() {
    let config = dose().prefill_with(|ctx| {
        Box::pin(async move {
            if ctx.writer.set_value("weight", "90") {
                Ok(())
            } else {
                Err(HookError::failed("weight field missing"))
            }
        })
    });
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().with_observation(Observation::new(
        BODY_WEIGHT,
        70.0,
        Some("kg"),
        days_ago(1),
    ));

    unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)))
        .settled()
        .await;
    assert_eq!(fragment.raw("weight").as_deref(), Some("90"));
}

async fn explode() -> Result<(), HookError> {
    panic!("lookup exploded")
}

#[tokio::test]
async fn panicking_hook_is_contained() {
    let config = dose().prefill_with(|_| Box::pin(explode()));
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();

    unit.attach(AttachContext::new(fragment.clone())).settled().await;
    fragment.set_value("weight", "50");
    assert!(fragment.result_markup().unwrap().contains("100"));
}

#[tokio::test]
async fn disabled_prefill_spawns_nothing() {
    let settings = EngineSettings {
        prefill_enabled: false,
        ..EngineSettings::default()
    };
    let unit = Engine::new(settings).unwrap().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let attachment = unit.attach(AttachContext::new(fragment.clone()));
    assert!(!attachment.has_prefill());
}

#[test]
fn attach_without_runtime_skips_prefill() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    let attachment = unit.attach(AttachContext::new(fragment.clone()));
    assert!(attachment.is_new());
    assert!(!attachment.has_prefill());
    fragment.set_value("weight", "10");
    assert!(fragment.is_result_visible());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_prefill_result_does_not_replace_newer_user_result() {
    let config = dose().render_with(|input| {
        let weight = input.values.number("weight");
        if weight == Some(80.0) {
            std::thread::sleep(Duration::from_millis(200));
        }
        Ok(format!("<p>{}</p>", weight.unwrap_or_default()))
    });
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().with_observation(Observation::new(
        BODY_WEIGHT,
        80.0,
        Some("kg"),
        days_ago(1),
    ));

    let attachment =
        unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)));
    let user = {
        let fragment = fragment.clone();
        tokio::task::spawn_blocking(move || {
            while fragment.raw("weight").as_deref() != Some("80.0") {
                std::thread::sleep(Duration::from_millis(5));
            }
            std::thread::sleep(Duration::from_millis(50));
            fragment.set_value("weight", "70");
        })
    };
    attachment.settled().await;
    user.await.unwrap();

    assert_eq!(fragment.raw("weight").as_deref(), Some("70"));
    assert_eq!(fragment.result_markup().as_deref(), Some("<p>70</p>"));
}

#[tokio::test]
async fn accepted_writes_advance_the_revision() {
    let unit = engine().compile(Arc::new(dose())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone())).settled().await;

    let before = fragment.revision();
    fragment.set_value("weight", "50");
    assert_eq!(fragment.revision(), before + 1);
    assert!(fragment.result_markup().unwrap().contains("100"));

    fragment.select("missing", "x");
    assert_eq!(fragment.revision(), before + 1);
}
