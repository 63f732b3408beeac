use std::sync::LazyLock;

use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{InputSpec, Layout, ObservationRule, SUBJECT_AGE, Section};
use medcalc_core::models::result::ResultItem;
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::classify::classify;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::error::HookError;
use medcalc_engine::hooks::RenderInput;
use medcalc_engine::render::TOTAL_SCORE_LABEL;

pub const ID: &str = "curb-65";

static LEVELS: LazyLock<Vec<RiskLevel>> = LazyLock::new(|| {
    vec![
        RiskLevel::new(0.0, 1.0, "Low risk", Severity::Success)
            .describe("Consider home treatment."),
        RiskLevel::new(2.0, 2.0, "Moderate risk", Severity::Warning)
            .describe("Consider a short inpatient stay or closely supervised outpatient care."),
        RiskLevel::new(3.0, 5.0, "High risk", Severity::Danger)
            .describe("Manage in hospital as severe pneumonia; assess for ICU admission at 4 or 5."),
    ]
});

/// 30-day mortality (%) by total score; 4 and 5 share one estimate.
const MORTALITY: [f64; 6] = [0.6, 2.7, 6.8, 14.0, 27.8, 27.8];

pub fn config() -> CalculatorConfig {
    let layout = Layout::Sections(vec![
        Section::new(
            "Clinical findings",
            vec![
                InputSpec::yes_no("curb-65-confusion", "Confusion", 1.0)
                    .help("New disorientation to person, place or time"),
                InputSpec::yes_no("curb-65-urea", "Urea > 7 mmol/L (BUN > 19 mg/dL)", 1.0),
                InputSpec::yes_no("curb-65-respiratory-rate", "Respiratory rate ≥ 30/min", 1.0)
                    .map_observation(
                        "9279-1",
                        vec![
                            ObservationRule::at_least(30.0, "1"),
                            ObservationRule::below_or_equal(29.0, "0"),
                        ],
                    ),
                InputSpec::yes_no(
                    "curb-65-blood-pressure",
                    "Systolic BP < 90 mmHg or diastolic BP ≤ 60 mmHg",
                    1.0,
                ),
            ],
        ),
        Section::new(
            "Demographics",
            vec![InputSpec::yes_no("curb-65-age", "Age ≥ 65", 1.0).map_observation(
                SUBJECT_AGE,
                vec![
                    ObservationRule::at_least(65.0, "1"),
                    ObservationRule::below_or_equal(64.0, "0"),
                ],
            )],
        ),
    ]);

    CalculatorConfig::score(ID, "CURB-65 Pneumonia Severity", layout)
        .describe("Severity of community-acquired pneumonia and 30-day mortality.")
        .risk_levels(LEVELS.clone())
        .render_with(render)
        .formula(
            FormulaDisplay::default()
                .criteria_header("Criterion")
                .criterion("Confusion", "+1")
                .criterion("Urea > 7 mmol/L", "+1")
                .criterion("Respiratory rate ≥ 30", "+1")
                .criterion("Low blood pressure", "+1")
                .criterion("Age ≥ 65", "+1")
                .interpretation("0 - 1", "Low risk", Some(Severity::Success))
                .interpretation("2", "Moderate risk", Some(Severity::Warning))
                .interpretation("3 - 5", "High risk", Some(Severity::Danger)),
        )
        .reference("Lim WS, et al. Defining community acquired pneumonia severity on presentation to hospital. Thorax. 2003;58(5):377-382.")
}

/// Total, level and the matching mortality estimate.
fn render(input: &RenderInput<'_>) -> Result<String, HookError> {
    let total = input
        .score
        .ok_or_else(|| HookError::failed("CURB-65 rendered without a total"))?;
    let level = classify(total, &LEVELS)
        .ok_or_else(|| HookError::failed(format!("CURB-65 total {total} outside the risk table")))?;
    let mortality = MORTALITY
        .get(total as usize)
        .copied()
        .ok_or_else(|| HookError::failed(format!("no mortality estimate for {total}")))?;

    let mut items = vec![
        ResultItem::new(TOTAL_SCORE_LABEL, total)
            .unit("points")
            .interpretation(&level.label)
            .severity(level.severity),
        ResultItem::new("30-day mortality", mortality).unit("%"),
    ];
    if let Some(description) = &level.description {
        items.push(ResultItem::alert(level.severity, description));
    }
    Ok(input.widgets.result_items(&items)?)
}
