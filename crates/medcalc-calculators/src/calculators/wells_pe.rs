use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, ObservationRule};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "wells-pe";

/// Wells criteria for pulmonary embolism, three-tier interpretation.
pub fn config() -> CalculatorConfig {
    let criteria = vec![
        ChoiceOption::new("3", "Clinical signs and symptoms of DVT").with_id("wells-pe-dvt-signs"),
        ChoiceOption::new("3", "PE is the most likely diagnosis").with_id("wells-pe-likely"),
        ChoiceOption::new("1.5", "Heart rate > 100 bpm").with_id("wells-pe-heart-rate"),
        ChoiceOption::new("1.5", "Immobilization ≥ 3 days or surgery in the previous 4 weeks")
            .with_id("wells-pe-immobilization"),
        ChoiceOption::new("1.5", "Previous DVT or PE")
            .with_id("wells-pe-previous")
            .when_condition(&["I26", "I82.4", "Z86.711", "Z86.718"]),
        ChoiceOption::new("1", "Hemoptysis").with_id("wells-pe-hemoptysis"),
        ChoiceOption::new("1", "Malignancy with treatment within 6 months or palliative")
            .with_id("wells-pe-malignancy"),
    ];
    let layout = Layout::Inputs(vec![
        InputSpec::checkboxes("wells-pe-criteria", "Criteria present", criteria).map_observation(
            "8867-4",
            vec![ObservationRule::at_least(101.0, "wells-pe-heart-rate")],
        ),
    ]);

    CalculatorConfig::score(ID, "Wells' Criteria for Pulmonary Embolism", layout)
        .risk_levels(vec![
            RiskLevel::new(0.0, 1.0, "Low probability", Severity::Success)
                .describe("About 1.3% prevalence; consider PERC or D-dimer."),
            RiskLevel::new(1.5, 6.0, "Moderate probability", Severity::Warning)
                .describe("About 16.2% prevalence; D-dimer or imaging."),
            RiskLevel::new(6.5, 12.5, "High probability", Severity::Danger)
                .describe("About 37.5% prevalence; CT pulmonary angiography."),
        ])
        .formula(
            FormulaDisplay::default()
                .criteria_header("Criterion")
                .criterion("Clinical signs of DVT", "+3")
                .criterion("PE most likely diagnosis", "+3")
                .criterion("Heart rate > 100", "+1.5")
                .criterion("Immobilization or recent surgery", "+1.5")
                .criterion("Previous DVT/PE", "+1.5")
                .criterion("Hemoptysis", "+1")
                .criterion("Malignancy", "+1")
                .footnote("Two-tier model: ≤ 4 PE unlikely, > 4 PE likely.")
                .interpretation("0 - 1", "Low", Some(Severity::Success))
                .interpretation("1.5 - 6", "Moderate", Some(Severity::Warning))
                .interpretation("> 6", "High", Some(Severity::Danger)),
        )
        .reference("Wells PS, et al. Derivation of a simple clinical model to categorize patients probability of pulmonary embolism. Thromb Haemost. 2000;83(3):416-420.")
}
