use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, ObservationRule, Section};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "4ts-hit";

/// Platelet count in blood, 10⁹/L.
const PLATELETS: &str = "777-3";

const TYPICAL: &str = "typical";
const RAPID: &str = "rapid";

fn options(choices: &[(&str, &str)]) -> Vec<ChoiceOption> {
    choices
        .iter()
        .map(|(points, label)| ChoiceOption::new(*points, *label))
        .collect()
}

/// Three-way criterion whose "None" answer is pre-selected.
fn thrombosis(name: &str, label: &str, onset: &str) -> InputSpec {
    let mut choices = options(&[
        ("3", "New VTE or ATE after heparin exposure (+3)"),
        ("2", "Progression of pre-existing VTE or ATE while receiving heparin (+2)"),
    ]);
    choices.push(ChoiceOption::new("0", "None (0)").checked());
    InputSpec::radio(name, label, choices).shown_when("hep-onset", &[onset])
}

/// HIT Expert Probability score. The timing and thrombosis criteria differ
/// between typical and rapid onset; only those matching the selected onset
/// are shown and counted.
pub fn config() -> CalculatorConfig {
    let onset = InputSpec::radio(
        "hep-onset",
        "Type of HIT onset suspected",
        vec![
            ChoiceOption::new(TYPICAL, "Typical onset").checked(),
            ChoiceOption::new(RAPID, "Rapid onset (re-exposure)"),
        ],
    );

    let features = vec![
        InputSpec::radio(
            "hep-fall",
            "Magnitude of platelet count fall",
            options(&[("-1", "< 30% (-1)"), ("1", "30 - 50% (+1)"), ("3", "> 50% (+3)")]),
        ),
        InputSpec::radio(
            "hep-timing-typical",
            "Timing of platelet count fall",
            options(&[
                ("-2", "Begins < 4 days after heparin exposure (-2)"),
                ("2", "Begins 4 days after heparin exposure (+2)"),
                ("3", "Begins 5 - 10 days after heparin exposure (+3)"),
                ("2", "Begins 11 - 14 days after heparin exposure (+2)"),
                ("-1", "Begins > 14 days after heparin exposure (-1)"),
            ]),
        )
        .shown_when("hep-onset", &[TYPICAL]),
        InputSpec::radio(
            "hep-timing-rapid",
            "Timing of platelet count fall",
            options(&[
                ("2", "Begins < 48 hours after heparin re-exposure (+2)"),
                ("-1", "Begins ≥ 48 hours after heparin re-exposure (-1)"),
            ]),
        )
        .shown_when("hep-onset", &[RAPID]),
        InputSpec::radio(
            "hep-nadir",
            "Nadir platelet count",
            options(&[("-2", "≤ 20 × 10⁹/L (-2)"), ("2", "> 20 × 10⁹/L (+2)")]),
        )
        .map_observation(
            PLATELETS,
            vec![
                ObservationRule::at_least(20.0, "2"),
                ObservationRule::below_or_equal(20.0, "-2"),
            ],
        ),
        thrombosis("hep-thrombosis-typical", "Thrombosis", TYPICAL),
        thrombosis("hep-thrombosis-rapid", "Thrombosis", RAPID),
        InputSpec::yes_no(
            "hep-skin-necrosis",
            "Skin necrosis at subcutaneous heparin injection sites",
            3.0,
        ),
        InputSpec::yes_no(
            "hep-systemic",
            "Acute systemic reaction after IV heparin bolus",
            2.0,
        ),
        InputSpec::yes_no(
            "hep-bleeding",
            "Bleeding, petechiae or extensive bruising",
            -1.0,
        ),
    ];

    let other_causes = vec![
        InputSpec::yes_no("hep-chronic", "Chronic thrombocytopenic disorder", -1.0),
        InputSpec::yes_no(
            "hep-medication",
            "Newly started non-heparin drug known to cause thrombocytopenia",
            -1.0,
        ),
        InputSpec::yes_no("hep-infection", "Severe infection", -2.0),
        InputSpec::yes_no(
            "hep-dic",
            "Severe DIC (fibrinogen < 100 mg/dL and D-dimer > 5 µg/mL)",
            -2.0,
        ),
        InputSpec::yes_no(
            "hep-device",
            "Indwelling intra-arterial device (IABP, VAD, ECMO)",
            -2.0,
        ),
        InputSpec::yes_no("hep-bypass", "Cardiopulmonary bypass within 96 hours", -1.0),
        InputSpec::yes_no("hep-no-other-cause", "No other apparent cause", 3.0),
    ];

    let layout = Layout::Sections(vec![
        Section::new("Onset", vec![onset]),
        Section::new("Thrombocytopenia features", features),
        Section::new("Other causes of thrombocytopenia", other_causes),
    ]);

    CalculatorConfig::score(
        ID,
        "HIT Expert Probability (HEP) Score for Heparin-Induced Thrombocytopenia",
        layout,
    )
    .describe("Pre-test clinical scoring model for HIT based on broad expert opinion.")
    .info("Select the type of HIT onset, then complete every criterion shown.")
    .risk_levels(vec![
        RiskLevel::new(-15.0, -1.0, "Low probability", Severity::Success)
            .describe("Scores ≤ -1 suggest a lower probability of HIT."),
        RiskLevel::new(0.0, 3.0, "Intermediate probability", Severity::Warning)
            .describe("Consider further testing."),
        RiskLevel::new(4.0, 19.0, "High probability", Severity::Danger)
            .describe("Scores ≥ 4 are more than 90% sensitive for HIT. Strongly consider the diagnosis."),
    ])
    .formula(
        FormulaDisplay::default()
            .note("Addition of the selected points.")
            .criterion("Magnitude of fall: < 30% / 30 - 50% / > 50%", "-1 / +1 / +3")
            .criterion("Timing (typical): < 4 d / 4 d / 5 - 10 d / 11 - 14 d / > 14 d", "-2 / +2 / +3 / +2 / -1")
            .criterion("Timing (rapid): < 48 h / ≥ 48 h", "+2 / -1")
            .criterion("Nadir platelets: ≤ 20 / > 20 × 10⁹/L", "-2 / +2")
            .criterion("Thrombosis: new / progression / none", "+3 / +2 / 0")
            .criterion("Skin necrosis", "+3")
            .criterion("Systemic reaction", "+2")
            .criterion("Bleeding or petechiae", "-1")
            .criterion("Chronic thrombocytopenia", "-1")
            .criterion("New medication", "-1")
            .criterion("Severe infection", "-2")
            .criterion("Severe DIC", "-2")
            .criterion("Intra-arterial device", "-2")
            .criterion("Bypass within 96 h", "-1")
            .criterion("No other cause", "+3"),
    )
    .reference("Cuker A, et al. The HIT Expert Probability (HEP) Score: a novel pre-test probability model for heparin-induced thrombocytopenia based on broad expert opinion. J Thromb Haemost. 2010;8(12):2642-2650.")
}
