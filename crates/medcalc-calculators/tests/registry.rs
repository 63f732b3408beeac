//! Built-in registry lookups, duplicate rejection and compilation.

use std::collections::BTreeSet;

use medcalc_calculators::calculators::{bmi_bsa, phq9};
use medcalc_calculators::error::RegistryError;
use medcalc_calculators::registry::Registry;
use medcalc_engine::classify::overlaps;
use medcalc_engine::compile::Engine;
use medcalc_engine::evaluate::Mode;
use medcalc_engine::settings::EngineSettings;

#[test]
fn builtin_ids_are_unique() {
    let registry = Registry::builtin().unwrap();
    let ids: BTreeSet<&str> = registry.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), registry.len());
    assert_eq!(registry.len(), 11);
}

#[test]
fn every_mode_is_represented() {
    let registry = Registry::builtin().unwrap();
    let modes: BTreeSet<String> = registry.summaries().iter().map(|s| s.mode.to_string()).collect();
    let expected: BTreeSet<String> = [Mode::Simple, Mode::Complex, Mode::Score]
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(modes, expected);
}

#[test]
fn every_builtin_compiles_and_renders() {
    let engine = Engine::new(EngineSettings::default()).unwrap();
    let registry = Registry::builtin().unwrap();
    for unit in registry.compile_all(&engine).unwrap() {
        let markup = unit.render().unwrap();
        assert!(markup.contains(&unit.result_region_id()), "{}", unit.id());
        assert!(markup.contains(unit.title()), "{}", unit.id());
    }
}

#[test]
fn builtin_risk_tables_are_clean() {
    let registry = Registry::builtin().unwrap();
    for config in registry.iter() {
        assert!(overlaps(&config.risk_levels).is_empty(), "{}", config.id);
    }
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = Registry::new();
    registry.register(bmi_bsa::config()).unwrap();
    registry.register(phq9::config()).unwrap();
    let err = registry.register(bmi_bsa::config()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateId(id) if id == bmi_bsa::ID));
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_id_is_an_error() {
    let registry = Registry::builtin().unwrap();
    assert!(matches!(
        registry.get("apgar"),
        Err(RegistryError::UnknownCalculator(id)) if id == "apgar"
    ));
    let engine = Engine::new(EngineSettings::default()).unwrap();
    assert!(registry.compile(&engine, "apgar").is_err());
}

#[test]
fn summary_counts_fields() {
    let registry = Registry::builtin().unwrap();
    let phq = registry
        .summaries()
        .into_iter()
        .find(|s| s.id == phq9::ID)
        .unwrap();
    assert_eq!(phq.fields, 9);
    assert_eq!(phq.risk_levels, 5);
    let json = serde_json::to_value(&phq).unwrap();
    assert_eq!(json["mode"], "score");
}
