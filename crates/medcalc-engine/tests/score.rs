//! Point-score calculators: option sums, completeness and custom tallies.

use std::sync::Arc;

use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, Section};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::attach::AttachContext;
use medcalc_engine::compile::Engine;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::error::EngineError;
use medcalc_engine::evaluate::Mode;
use medcalc_engine::settings::EngineSettings;

fn engine() -> Engine {
    Engine::new(EngineSettings::default()).unwrap()
}

fn graded(name: &str) -> InputSpec {
    InputSpec::radio(
        name,
        name,
        vec![
            ChoiceOption::new("0", "None"),
            ChoiceOption::new("2", "Some"),
            ChoiceOption::new("4", "Severe"),
        ],
    )
}

fn levels() -> Vec<RiskLevel> {
    vec![
        RiskLevel::new(0.0, 1.0, "Low", Severity::Success),
        RiskLevel::new(2.0, 4.0, "Moderate", Severity::Warning)
            .describe("Consider further evaluation"),
        RiskLevel::new(5.0, 12.0, "High", Severity::Danger),
    ]
}

/// Three sections, each defaulting to "0".
fn triad() -> CalculatorConfig {
    let section = |name: &str| Section::new(name, vec![graded(name).default_value("0")]);
    CalculatorConfig::score(
        "triad",
        "Triad Score",
        Layout::Sections(vec![section("a"), section("b"), section("c")]),
    )
    .risk_levels(levels())
}

#[test]
fn defaults_score_immediately_on_attach() {
    let unit = engine().compile(Arc::new(triad())).unwrap();
    assert_eq!(unit.mode(), Mode::Score);
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));

    let markup = fragment.result_markup().expect("shown with defaults");
    assert!(markup.contains("Total Score"));
    assert!(markup.contains("Low"));
}

#[test]
fn changing_one_section_moves_total_and_level() {
    let unit = engine().compile(Arc::new(triad())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));

    assert!(fragment.select("b", "4"));
    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(4.0));
    assert_eq!(presentation.level.as_ref().unwrap().label, "Moderate");
    assert_eq!(presentation.summary(), "Total Score: 4 points (Moderate)");

    let markup = fragment.result_markup().unwrap();
    assert!(markup.contains("Moderate"));
    assert!(markup.contains("ui-alert-warning"));
    assert!(markup.contains("Consider further evaluation"));

    let outcome = unit.evaluate(&fragment).unwrap();
    let breakdown = outcome.breakdown().unwrap();
    assert_eq!(breakdown["a"], 0.0);
    assert_eq!(breakdown["b"], 4.0);
}

#[test]
fn unknown_option_value_is_not_selected() {
    let unit = engine().compile(Arc::new(triad())).unwrap();
    let fragment = unit.mount().unwrap();
    assert!(!fragment.select("a", "3"));
    assert_eq!(fragment.selected("a").as_deref(), Some("0"));
}

#[test]
fn total_between_levels_is_shown_without_label() {
    let config = triad().risk_levels(vec![
        RiskLevel::new(0.0, 1.0, "Low", Severity::Success),
        RiskLevel::new(5.0, 12.0, "High", Severity::Danger),
    ]);
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));
    fragment.select("a", "2");

    let presentation = unit.present(&fragment).unwrap();
    assert!(presentation.level.is_none());
    assert_eq!(presentation.summary(), "Total Score: 2 points");
    assert!(fragment.is_result_visible());
}

fn questionnaire() -> CalculatorConfig {
    let question = |name: &str| {
        InputSpec::radio(
            name,
            name,
            vec![
                ChoiceOption::new("0", "Not at all"),
                ChoiceOption::new("1", "Several days"),
                ChoiceOption::new("2", "More than half the days"),
                ChoiceOption::new("3", "Nearly every day"),
            ],
        )
    };
    CalculatorConfig::score(
        "questionnaire",
        "Questionnaire",
        Layout::Inputs(vec![question("q1"), question("q2"), question("q3")]),
    )
    .risk_levels(vec![
        RiskLevel::new(0.0, 4.0, "Minimal", Severity::Success),
        RiskLevel::new(5.0, 9.0, "Moderate", Severity::Warning),
    ])
}

#[test]
fn unanswered_required_group_withholds_total() {
    let unit = engine().compile(Arc::new(questionnaire())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));
    assert!(!fragment.is_result_visible());

    fragment.select("q1", "3");
    fragment.select("q2", "2");
    assert!(!fragment.is_result_visible());
    assert!(unit.evaluate(&fragment).is_none());

    fragment.select("q3", "1");
    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(6.0));
    assert_eq!(presentation.level.unwrap().label, "Moderate");
}

fn checklist() -> CalculatorConfig {
    CalculatorConfig::score(
        "checklist",
        "Checklist",
        Layout::Inputs(vec![InputSpec::checkboxes(
            "criteria",
            "Criteria",
            vec![
                ChoiceOption::new("1", "Hypertension").with_id("htn"),
                ChoiceOption::new("1", "Renal disease").with_id("renal"),
                ChoiceOption::new("1.5", "Heart rate above 100").with_id("hr"),
            ],
        )]),
    )
    .risk_levels(vec![
        RiskLevel::new(0.0, 1.0, "Low", Severity::Success),
        RiskLevel::new(1.5, 4.0, "High", Severity::Danger),
    ])
}

#[test]
fn zero_checked_boxes_score_zero() {
    let unit = engine().compile(Arc::new(checklist())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));

    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(0.0));
    assert_eq!(presentation.level.unwrap().label, "Low");
    assert!(fragment.is_result_visible());
}

#[test]
fn fractional_points_add_up() {
    let unit = engine().compile(Arc::new(checklist())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));

    assert!(fragment.set_checked("hr", true));
    assert!(fragment.set_checked("renal", true));
    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(2.5));
    assert_eq!(presentation.level.unwrap().label, "High");

    fragment.set_checked("hr", false);
    assert_eq!(unit.present(&fragment).unwrap().score, Some(1.0));
}

#[test]
fn non_numeric_option_counts_as_zero() {
    let config = CalculatorConfig::score(
        "odd",
        "Odd",
        Layout::Inputs(vec![InputSpec::radio(
            "pick",
            "Pick",
            vec![
                ChoiceOption::new("unknown", "Unknown").checked(),
                ChoiceOption::new("2", "Two"),
            ],
        )]),
    );
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    assert_eq!(unit.present(&fragment).unwrap().score, Some(0.0));
}

#[test]
fn tally_mixes_numbers_and_options() {
    let layout = Layout::Inputs(vec![
        InputSpec::number("age", "Age").unit("years"),
        InputSpec::checkboxes(
            "signs",
            "Signs",
            vec![
                ChoiceOption::new("1", "Fever").with_id("fever"),
                ChoiceOption::new("1", "Exudate").with_id("exudate"),
            ],
        ),
    ]);
    let config = CalculatorConfig::score("mixed", "Mixed", layout).tally(|values| {
        let age = values.number("age")?;
        let band = if age < 15.0 {
            1.0
        } else if age >= 45.0 {
            -1.0
        } else {
            0.0
        };
        Some(band + values.checked_total("signs"))
    });
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));
    assert!(!fragment.is_result_visible());

    fragment.set_value("age", "50");
    fragment.set_checked("fever", true);
    let outcome = unit.evaluate(&fragment).unwrap();
    assert_eq!(outcome.score(), Some(0.0));
    assert_eq!(outcome.breakdown().unwrap()["signs"], 1.0);

    fragment.set_value("age", "10");
    assert_eq!(unit.evaluate(&fragment).unwrap().score(), Some(2.0));
}

#[test]
fn custom_renderer_sees_total_and_breakdown() {
    let config = triad().render_with(|input| {
        let total = input.score.unwrap_or_default();
        Ok(format!(
            "<p>{total} from {} groups</p>",
            input.breakdown.len()
        ))
    });
    let unit = engine().compile(Arc::new(config)).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));
    fragment.select("c", "2");
    assert_eq!(fragment.result_markup().as_deref(), Some("<p>2 from 3 groups</p>"));
}

#[test]
fn sum_without_option_groups_is_rejected() {
    let config = CalculatorConfig::score(
        "empty",
        "Empty",
        Layout::Inputs(vec![InputSpec::number("x", "X")]),
    );
    assert!(matches!(
        engine().compile(Arc::new(config)),
        Err(EngineError::InvalidConfig { .. })
    ));
}

/// Timing criteria depend on the onset type; only the shown one counts.
fn onset_gated() -> CalculatorConfig {
    let onset = InputSpec::radio(
        "onset",
        "Onset",
        vec![
            ChoiceOption::new("typical", "Typical").checked(),
            ChoiceOption::new("rapid", "Rapid"),
        ],
    );
    let typical = InputSpec::radio(
        "timing-typical",
        "Timing (typical)",
        vec![ChoiceOption::new("-2", "Early"), ChoiceOption::new("3", "Day 5 to 10")],
    )
    .shown_when("onset", &["typical"]);
    let rapid = InputSpec::radio(
        "timing-rapid",
        "Timing (rapid)",
        vec![ChoiceOption::new("2", "Within 48 h"), ChoiceOption::new("-1", "Later")],
    )
    .shown_when("onset", &["rapid"]);
    CalculatorConfig::score(
        "onset-gated",
        "Onset Gated",
        Layout::Sections(vec![
            Section::new("Onset", vec![onset]),
            Section::new("Timing", vec![typical, rapid, InputSpec::yes_no("bleeding", "Bleeding", -1.0)]),
        ]),
    )
}

#[test]
fn hidden_criteria_neither_count_nor_gate() {
    let unit = engine().compile(Arc::new(onset_gated())).unwrap();
    let fragment = unit.mount().unwrap();
    unit.attach(AttachContext::new(fragment.clone()));

    assert_eq!(unit.hidden_fields(&fragment), vec!["timing-rapid".to_string()]);
    assert!(!fragment.is_result_visible());

    fragment.select("timing-typical", "3");
    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(3.0));

    fragment.select("timing-rapid", "2");
    assert_eq!(unit.present(&fragment).unwrap().score, Some(3.0));

    fragment.select("onset", "rapid");
    assert_eq!(unit.hidden_fields(&fragment), vec!["timing-typical".to_string()]);
    let presentation = unit.present(&fragment).unwrap();
    assert_eq!(presentation.score, Some(2.0));
    let breakdown = match unit.evaluate(&fragment).unwrap() {
        medcalc_engine::evaluate::Outcome::Score(score) => score.breakdown,
        other => panic!("expected a score, got {other:?}"),
    };
    assert!(!breakdown.contains_key("timing-typical"));
    assert!(fragment.result_markup().unwrap().contains("Total Score"));
}

#[test]
fn visibility_must_follow_a_choice_group() {
    let layout = Layout::Inputs(vec![
        InputSpec::number("age", "Age"),
        InputSpec::yes_no("frail", "Frail", 1.0).shown_when("age", &["80"]),
    ]);
    let err = engine()
        .compile(Arc::new(CalculatorConfig::score("odd", "Odd", layout)))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig { .. }));
}

#[test]
fn rendered_markup_hides_criteria_for_other_onset() {
    let unit = engine().compile(Arc::new(onset_gated())).unwrap();
    let markup = unit.render().unwrap();
    assert!(markup.contains(r#"data-visible-values="rapid" hidden>"#));
    assert!(markup.contains(r#"data-visible-values="typical">"#));
}
