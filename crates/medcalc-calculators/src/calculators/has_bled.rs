use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, ObservationRule, SUBJECT_AGE};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "has-bled";

/// Major bleeding risk on anticoagulation. One point per checked criterion.
pub fn config() -> CalculatorConfig {
    let criteria = vec![
        ChoiceOption::new("1", "Hypertension (uncontrolled, systolic > 160 mmHg)")
            .with_id("has-bled-hypertension")
            .when_condition(&["I10", "I11", "I12", "I13", "I15"]),
        ChoiceOption::new("1", "Abnormal renal function")
            .with_id("has-bled-renal")
            .describe("Dialysis, transplant, or creatinine > 2.26 mg/dL")
            .when_condition(&["N18.5", "N18.6", "Z99.2"]),
        ChoiceOption::new("1", "Abnormal liver function")
            .with_id("has-bled-liver")
            .describe("Cirrhosis, or bilirubin > 2× normal with AST/ALT/ALP > 3× normal")
            .when_condition(&["K74"]),
        ChoiceOption::new("1", "Stroke history")
            .with_id("has-bled-stroke")
            .when_condition(&["I63", "I64", "Z86.73"]),
        ChoiceOption::new("1", "Prior major bleeding or predisposition")
            .with_id("has-bled-bleeding"),
        ChoiceOption::new("1", "Labile INR").with_id("has-bled-inr"),
        ChoiceOption::new("1", "Elderly (age > 65)").with_id("has-bled-elderly"),
        ChoiceOption::new("1", "Antiplatelet or NSAID use").with_id("has-bled-drugs"),
        ChoiceOption::new("1", "Alcohol use (≥ 8 drinks/week)")
            .with_id("has-bled-alcohol")
            .when_condition(&["F10"]),
    ];
    let layout = Layout::Inputs(vec![
        InputSpec::checkboxes("has-bled-criteria", "Criteria present", criteria).map_observation(
            SUBJECT_AGE,
            vec![ObservationRule::at_least(66.0, "has-bled-elderly")],
        ),
    ]);

    CalculatorConfig::score(ID, "HAS-BLED Bleeding Risk", layout)
        .risk_levels(vec![
            RiskLevel::new(0.0, 1.0, "Low risk", Severity::Success)
                .describe("Anticoagulation can be considered."),
            RiskLevel::new(2.0, 2.0, "Moderate risk", Severity::Warning)
                .describe("Anticoagulation can be considered with caution."),
            RiskLevel::new(3.0, 9.0, "High risk", Severity::Danger)
                .describe("Address modifiable risk factors and review the patient regularly."),
        ])
        .formula(
            FormulaDisplay::default()
                .note("One point for each criterion present.")
                .footnote("A high score is not by itself a reason to withhold anticoagulation.")
                .interpretation("0 - 1", "Low", Some(Severity::Success))
                .interpretation("2", "Moderate", Some(Severity::Warning))
                .interpretation("≥ 3", "High", Some(Severity::Danger)),
        )
        .reference("Pisters R, et al. A novel user-friendly score (HAS-BLED) to assess 1-year risk of major bleeding in patients with atrial fibrillation. Chest. 2010;138(5):1093-1100.")
}
