//! Built-in calculators filled from a subject's record.

use std::sync::Arc;

use jiff::civil::date;
use jiff::{SignedDuration, Timestamp};

use medcalc_calculators::calculators::{ckd_epi, has_bled, hep};
use medcalc_calculators::registry::Registry;
use medcalc_engine::attach::AttachContext;
use medcalc_engine::compile::Engine;
use medcalc_engine::settings::EngineSettings;
use medcalc_record::memory::InMemoryRecords;
use medcalc_record::observation::Observation;
use medcalc_record::subject::{Sex, Subject};

#[tokio::test]
async fn has_bled_picks_up_conditions_and_age() {
    let engine = Engine::new(EngineSettings::default()).unwrap();
    let unit = Registry::builtin().unwrap().compile(&engine, has_bled::ID).unwrap();
    let fragment = unit.mount().unwrap();
    let subject = Subject::new("p-7").born(date(1940, 6, 1));
    let records = InMemoryRecords::new().with_condition("I10").with_condition("F10");

    unit.attach(
        AttachContext::new(fragment.clone())
            .with_record(Arc::new(records))
            .with_subject(subject),
    )
    .settled()
    .await;

    assert_eq!(fragment.is_checked("has-bled-hypertension"), Some(true));
    assert_eq!(fragment.is_checked("has-bled-alcohol"), Some(true));
    assert_eq!(fragment.is_checked("has-bled-elderly"), Some(true));
    assert_eq!(fragment.is_checked("has-bled-stroke"), Some(false));
    assert_eq!(unit.present(&fragment).unwrap().score, Some(3.0));
}

#[tokio::test]
async fn ckd_epi_is_complete_after_prefill() {
    let engine = Engine::new(EngineSettings::default()).unwrap();
    let unit = Registry::builtin().unwrap().compile(&engine, ckd_epi::ID).unwrap();
    let fragment = unit.mount().unwrap();
    let subject = Subject::new("p-8").born(date(1960, 1, 1)).sex(Sex::Male);
    let records = InMemoryRecords::new().with_observation(Observation::new(
        "2160-0",
        88.4,
        Some("µmol/L"),
        Timestamp::now() - SignedDuration::from_hours(48),
    ));

    unit.attach(
        AttachContext::new(fragment.clone())
            .with_record(Arc::new(records))
            .with_subject(subject),
    )
    .settled()
    .await;

    assert_eq!(fragment.raw("ckd-epi-creatinine").as_deref(), Some("1.00"));
    assert_eq!(fragment.selected("ckd-epi-sex").as_deref(), Some("male"));
    assert!(fragment.is_result_visible());
    assert!(fragment.stale_fields().is_empty());
}

#[tokio::test]
async fn hep_nadir_follows_platelet_count() {
    let engine = Engine::new(EngineSettings::default()).unwrap();
    let unit = Registry::builtin().unwrap().compile(&engine, hep::ID).unwrap();
    let fragment = unit.mount().unwrap();
    let records = InMemoryRecords::new().with_observation(Observation::new(
        "777-3",
        15.0,
        Some("10*9/L"),
        Timestamp::now() - SignedDuration::from_hours(6),
    ));

    unit.attach(AttachContext::new(fragment.clone()).with_record(Arc::new(records)))
        .settled()
        .await;

    assert_eq!(fragment.selected("hep-nadir").as_deref(), Some("-2"));
    assert!(fragment.stale_fields().is_empty());
}
