//! Markup produced for fields, sections and results.

use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, Section};
use medcalc_core::models::result::ResultItem;
use medcalc_core::models::severity::Severity;
use medcalc_widgets::render::{Shell, Widgets};

fn widgets() -> Widgets {
    Widgets::new().expect("templates compile")
}

#[test]
fn number_input_with_toggle_renders_unit_button() {
    let field = InputSpec::number("weight", "Weight")
        .toggle("weight", "kg", &["kg", "lbs"])
        .placeholder("e.g. 70")
        .bounds(1.0, 400.0);
    let markup = widgets().number_input(&field).unwrap();

    assert!(markup.contains(r#"id="weight""#));
    assert!(markup.contains(r#"class="ui-unit-toggle""#));
    assert!(markup.contains(r#"data-units="kg|lbs""#));
    assert!(markup.contains(r#"data-standard="kg""#));
    assert!(markup.contains(r#"min="1""#));
    assert!(markup.contains(r#"placeholder="e.g. 70""#));
}

#[test]
fn static_unit_is_shown_without_toggle() {
    let field = InputSpec::number("age", "Age").unit("years");
    let markup = widgets().field(&field).unwrap();
    assert!(markup.contains(r#"<span class="ui-input-unit">years</span>"#));
    assert!(!markup.contains("ui-unit-toggle"));
}

#[test]
fn radio_group_marks_default_option() {
    let field = InputSpec::yes_no("confusion", "Confusion", 1.0);
    let markup = widgets().field(&field).unwrap();

    assert!(markup.contains(r#"class="ui-radio-group""#));
    assert!(markup.contains(r#"id="confusion-0" name="confusion" value="0" checked"#));
    assert!(markup.contains(r#"id="confusion-1" name="confusion" value="1">"#));
}

#[test]
fn default_value_overrides_checked_flags_in_single_choice_groups() {
    let field = InputSpec::select(
        "sex",
        "Sex",
        vec![
            ChoiceOption::new("male", "Male").checked(),
            ChoiceOption::new("female", "Female"),
        ],
    )
    .default_value("female");
    let markup = widgets().field(&field).unwrap();
    assert!(markup.contains(r#"<option value="female" selected>"#));
    assert!(markup.contains(r#"<option value="male">"#));
}

#[test]
fn checkbox_group_uses_explicit_ids() {
    let field = InputSpec::checkboxes(
        "hasbled",
        "",
        vec![
            ChoiceOption::new("1", "Hypertension").with_id("hasbled-htn"),
            ChoiceOption::new("1", "Stroke history"),
        ],
    );
    let markup = widgets().field(&field).unwrap();
    assert!(markup.contains(r#"class="ui-checkbox-option" for="hasbled-htn""#));
    assert!(markup.contains(r#"id="hasbled-1""#));
    assert!(!markup.contains("ui-group-label"));
}

#[test]
fn flat_layout_renders_single_measurements_section() {
    let layout = Layout::Inputs(vec![
        InputSpec::number("weight", "Weight"),
        InputSpec::number("height", "Height"),
    ]);
    let sections = widgets().layout(&layout).unwrap();
    assert_eq!(sections.len(), 1);
    assert!(sections[0].contains("Measurements"));
    assert!(sections[0].contains(r#"id="height""#));
}

#[test]
fn section_carries_subtitle_and_icon() {
    let section = Section::new("Symptoms", vec![InputSpec::yes_no("fever", "Fever", 1.0)])
        .subtitle("Within the last 24 hours")
        .icon("🌡️");
    let markup = widgets().section(&section).unwrap();
    assert!(markup.contains(r#"<h4 class="ui-section-title">Symptoms</h4>"#));
    assert!(markup.contains("Within the last 24 hours"));
    assert!(markup.contains("ui-section-icon"));
}

#[test]
fn fields_for_another_selection_render_hidden() {
    let onset = InputSpec::radio(
        "onset",
        "Onset",
        vec![
            ChoiceOption::new("typical", "Typical").checked(),
            ChoiceOption::new("rapid", "Rapid"),
        ],
    );
    let layout = Layout::Sections(vec![
        Section::new("Onset", vec![onset]),
        Section::new(
            "Timing",
            vec![
                InputSpec::yes_no("early", "Early fall", 2.0).shown_when("onset", &["typical"]),
                InputSpec::yes_no("late", "Late fall", -1.0).shown_when("onset", &["rapid"]),
            ],
        ),
    ]);

    let sections = widgets().layout(&layout).unwrap();
    let timing = &sections[1];
    assert!(timing.contains(r#"data-visible-when="onset" data-visible-values="typical">"#));
    assert!(timing.contains(r#"data-visible-when="onset" data-visible-values="rapid" hidden>"#));
    assert!(!sections[0].contains(" hidden>"));
}

#[test]
fn result_item_renders_unit_and_interpretation() {
    let item = ResultItem::new("BMI", 22.9)
        .unit("kg/m²")
        .interpretation("Normal weight")
        .severity(Severity::Success);
    let markup = widgets().result_item(&item).unwrap();
    assert!(markup.contains("ui-result-success"));
    assert!(markup.contains(r#"<span class="ui-result-value">22.9</span>"#));
    assert!(markup.contains("kg/m²"));
    assert!(markup.contains("Normal weight"));
}

#[test]
fn alert_items_render_as_call_outs() {
    let item = ResultItem::alert(Severity::Warning, "Sodium ratio undefined");
    let markup = widgets().result_item(&item).unwrap();
    assert!(markup.contains("ui-alert ui-alert-warning"));
    assert!(markup.contains("Sodium ratio undefined"));
    assert!(!markup.contains("__ALERT__"));
}

#[test]
fn result_box_hidden_until_visible() {
    let w = widgets();
    let hidden = w.result_box("bmi-result", "Results", "", false).unwrap();
    assert!(hidden.contains(" hidden>"));
    let shown = w.result_box("bmi-result", "Results", "<p>x</p>", true).unwrap();
    assert!(!shown.contains("hidden"));
    assert!(shown.contains("<p>x</p>"));
}

#[test]
fn formula_section_lists_criteria_and_interpretations() {
    let formula = FormulaDisplay::formulas(&[("BMI", "weight / height²")])
        .criteria_header("Clinical")
        .criterion("Confusion", "+1")
        .interpretation("0-1", "Low risk", Some(Severity::Success))
        .footnote("Adapted from Lim et al.");
    let markup = widgets().formula_section(&formula).unwrap();

    assert!(markup.contains("<code>weight / height²</code>"));
    assert!(markup.contains(r#"<th colspan="2">Clinical</th>"#));
    assert!(markup.contains("<td>Confusion</td><td>+1</td>"));
    assert!(markup.contains(r#"class="ui-row-success""#));
    assert!(markup.contains("<th>Score</th><th>Interpretation</th>"));
    assert!(markup.contains("Adapted from Lim et al."));
}

#[test]
fn calculator_shell_assembles_parts() {
    let references = vec!["Lim WS et al. Thorax 2003.".to_string()];
    let shell = Shell {
        id: "curb-65",
        title: "CURB-65",
        description: Some("Pneumonia severity"),
        alerts: vec![],
        sections: vec!["<section>one</section>".into()],
        result_box: "<div class=\"ui-result-box\"></div>".into(),
        formula: None,
        references: &references,
    };
    let markup = widgets().calculator(&shell).unwrap();
    assert!(markup.contains(r#"id="calc-curb-65""#));
    assert!(markup.contains("<section>one</section>"));
    assert!(markup.contains("<li>Lim WS et al. Thorax 2003.</li>"));
}
