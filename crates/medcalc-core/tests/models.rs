//! Calculator model builders and invariants.

use medcalc_core::models::input::{ChoiceOption, InputKind, InputSpec, Layout, ObservationRule, Section, UnitToggle};
use medcalc_core::models::result::{ResultItem, ResultValue, round_to};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;

#[test]
fn severity_parses_case_insensitively() {
    assert_eq!("Danger".parse::<Severity>().unwrap(), Severity::Danger);
    assert_eq!(Severity::Warning.alert_class(), "ui-alert-warning");
    assert!("catastrophic".parse::<Severity>().is_err());
}

#[test]
fn risk_level_ranges_are_closed() {
    let level = RiskLevel::new(2.0, 4.0, "Moderate", Severity::Warning);
    assert!(level.contains(2.0));
    assert!(level.contains(4.0));
    assert!(!level.contains(4.5));

    let next = RiskLevel::new(4.0, 10.0, "High", Severity::Danger);
    assert!(level.overlaps(&next));
    let disjoint = RiskLevel::new(5.0, 10.0, "High", Severity::Danger);
    assert!(!level.overlaps(&disjoint));
}

#[test]
fn unit_toggle_cycles_through_units() {
    let toggle = UnitToggle::new("weight", &["kg", "lbs", "g"]);
    assert_eq!(toggle.default, "kg");
    assert_eq!(toggle.next_after("kg"), Some("lbs"));
    assert_eq!(toggle.next_after("g"), Some("kg"));
}

#[test]
fn yes_no_preselects_zero() {
    let field = InputSpec::yes_no("curb-age", "Age ≥ 65", 1.0);
    assert_eq!(field.kind, InputKind::Radio);
    assert_eq!(field.options[0].value, "0");
    assert!(field.options[0].checked);
    assert_eq!(field.options[1].value, "1");
}

#[test]
fn checkbox_option_ids_default_to_group_index() {
    let field = InputSpec::checkboxes(
        "risk",
        "Risk factors",
        vec![
            ChoiceOption::new("1", "Hypertension").with_id("risk-htn"),
            ChoiceOption::new("1", "Diabetes"),
        ],
    );
    assert_eq!(field.option_ids(), vec!["risk-htn".to_string(), "risk-1".to_string()]);
    assert!(!field.required);
}

#[test]
fn display_unit_prefers_toggle_default() {
    let weight = InputSpec::number("w", "Weight").toggle("weight", "kg", &["lbs", "kg"]);
    assert_eq!(weight.display_unit(), Some("lbs"));
    let age = InputSpec::number("age", "Age").unit("years");
    assert_eq!(age.display_unit(), Some("years"));
}

#[test]
fn flat_layout_is_wrapped_in_one_section() {
    let layout = Layout::Inputs(vec![InputSpec::number("a", "A"), InputSpec::number("b", "B")]);
    let sections = layout.sections();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "Measurements");
    assert_eq!(layout.fields().count(), 2);

    let mixed = Layout::Sections(vec![
        Section::new("Vitals", vec![InputSpec::number("hr", "Heart rate")]),
        Section::new("History", vec![InputSpec::yes_no("prior", "Prior event", 1.5)]),
    ]);
    assert!(mixed.field("prior").is_some());
    assert!(mixed.field("missing").is_none());
}

#[test]
fn observation_rules_match_open_and_closed_ranges() {
    assert!(ObservationRule::at_least(30.0, "1").matches(30.0));
    assert!(!ObservationRule::at_least(30.0, "1").matches(29.9));
    assert!(ObservationRule::below_or_equal(90.0, "1").matches(90.0));
    assert!(ObservationRule::between(1.0, 2.0, "1").matches(1.5));
}

#[test]
fn result_items_render_values_plainly() {
    let item = ResultItem::new("BMI", round_to(22.857, 1)).unit("kg/m²");
    assert_eq!(item.value.to_string(), "22.9");
    assert_eq!(ResultValue::from(4.0).to_string(), "4");
    assert!(ResultItem::alert(Severity::Info, "note").is_alert());
    assert!(!item.is_alert());
}

#[test]
fn result_payload_is_serialized() {
    let item = ResultItem::new("Score", 3.0)
        .with_payload(&vec!["a", "b"])
        .unwrap();
    assert_eq!(item.payload, Some(serde_json::json!(["a", "b"])));
}
