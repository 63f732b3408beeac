use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, Section};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "phq-9";

const QUESTIONS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself, or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed, or the opposite: being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead, or of hurting yourself in some way",
];

fn frequency() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("0", "Not at all"),
        ChoiceOption::new("1", "Several days"),
        ChoiceOption::new("2", "More than half the days"),
        ChoiceOption::new("3", "Nearly every day"),
    ]
}

/// Patient Health Questionnaire depression severity. Every item must be
/// answered before a total is shown.
pub fn config() -> CalculatorConfig {
    let items = QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, question)| {
            InputSpec::radio(&format!("phq-9-q{}", index + 1), question, frequency())
        })
        .collect();
    let layout = Layout::Sections(vec![
        Section::new("Over the last 2 weeks, how often have you been bothered by:", items),
    ]);

    CalculatorConfig::score(ID, "PHQ-9 Depression Severity", layout)
        .info("Any positive answer to item 9 warrants a suicide risk assessment regardless of the total.")
        .risk_levels(vec![
            RiskLevel::new(0.0, 4.0, "Minimal depression", Severity::Success),
            RiskLevel::new(5.0, 9.0, "Mild depression", Severity::Info)
                .describe("Watchful waiting; repeat PHQ-9 at follow-up."),
            RiskLevel::new(10.0, 14.0, "Moderate depression", Severity::Warning)
                .describe("Treatment plan: counseling, follow-up and/or pharmacotherapy."),
            RiskLevel::new(15.0, 19.0, "Moderately severe depression", Severity::Danger)
                .describe("Active treatment with pharmacotherapy and/or psychotherapy."),
            RiskLevel::new(20.0, 27.0, "Severe depression", Severity::Danger)
                .describe("Immediate initiation of pharmacotherapy; expedited referral."),
        ])
        .formula(
            FormulaDisplay::default()
                .note("Sum of nine items, each scored 0 to 3.")
                .interpretation("0 - 4", "Minimal", Some(Severity::Success))
                .interpretation("5 - 9", "Mild", Some(Severity::Info))
                .interpretation("10 - 14", "Moderate", Some(Severity::Warning))
                .interpretation("15 - 19", "Moderately severe", Some(Severity::Danger))
                .interpretation("20 - 27", "Severe", Some(Severity::Danger)),
        )
        .reference("Kroenke K, Spitzer RL, Williams JB. The PHQ-9: validity of a brief depression severity measure. J Gen Intern Med. 2001;16(9):606-613.")
}
