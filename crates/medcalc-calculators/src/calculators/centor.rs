use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, SUBJECT_AGE, Section};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "centor";

/// Age adjustment of the McIsaac modification. None below 3 years, where
/// the score is not validated.
pub fn age_points(age: f64) -> Option<f64> {
    match age {
        a if a < 3.0 => None,
        a if a < 15.0 => Some(1.0),
        a if a < 45.0 => Some(0.0),
        _ => Some(-1.0),
    }
}

/// Centor score with the McIsaac age modification for streptococcal
/// pharyngitis.
pub fn config() -> CalculatorConfig {
    let layout = Layout::Sections(vec![
        Section::new(
            "Patient",
            vec![
                InputSpec::number("centor-age", "Age")
                    .unit("years")
                    .bounds(0.0, 120.0)
                    .observation(SUBJECT_AGE),
            ],
        ),
        Section::new(
            "Findings",
            vec![InputSpec::checkboxes(
                "centor-findings",
                "Findings present",
                vec![
                    ChoiceOption::new("1", "Tonsillar exudate or swelling").with_id("centor-exudate"),
                    ChoiceOption::new("1", "Tender or swollen anterior cervical nodes")
                        .with_id("centor-nodes"),
                    ChoiceOption::new("1", "Temperature > 38 °C").with_id("centor-fever"),
                    ChoiceOption::new("1", "Cough absent").with_id("centor-no-cough"),
                ],
            )],
        ),
    ]);

    CalculatorConfig::score(ID, "Centor Score (McIsaac Modification)", layout)
        .tally(|values| {
            let age = values.number("centor-age")?;
            Some(age_points(age)? + values.checked_total("centor-findings"))
        })
        .risk_levels(vec![
            RiskLevel::new(-1.0, 1.0, "Low risk", Severity::Success)
                .describe("No culture or antibiotics needed."),
            RiskLevel::new(2.0, 3.0, "Moderate risk", Severity::Warning)
                .describe("Throat culture or rapid antigen test; treat if positive."),
            RiskLevel::new(4.0, 5.0, "High risk", Severity::Danger)
                .describe("Culture and consider empiric antibiotics."),
        ])
        .formula(
            FormulaDisplay::default()
                .criteria_header("Age")
                .criterion("3 - 14 years", "+1")
                .criterion("15 - 44 years", "0")
                .criterion("≥ 45 years", "-1")
                .criteria_header("Findings")
                .criterion("Exudate or swelling of tonsils", "+1")
                .criterion("Tender/swollen anterior cervical nodes", "+1")
                .criterion("Temperature > 38 °C", "+1")
                .criterion("Absence of cough", "+1"),
        )
        .reference("McIsaac WJ, et al. A clinical score to reduce unnecessary antibiotic use in patients with sore throat. CMAJ. 1998;158(1):75-83.")
}
