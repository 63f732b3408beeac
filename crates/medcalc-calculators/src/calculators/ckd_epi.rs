use std::sync::LazyLock;

use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout, SUBJECT_AGE, SUBJECT_SEX};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_core::models::risk::RiskLevel;
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::evaluate::ComplexOutcome;

pub const ID: &str = "ckd-epi";

/// KDIGO GFR categories for a rounded eGFR.
pub static STAGES: LazyLock<Vec<RiskLevel>> = LazyLock::new(|| {
    vec![
        RiskLevel::new(0.0, 14.0, "G5", Severity::Danger).describe("Kidney failure"),
        RiskLevel::new(15.0, 29.0, "G4", Severity::Danger).describe("Severely decreased"),
        RiskLevel::new(30.0, 44.0, "G3b", Severity::Warning)
            .describe("Moderately to severely decreased"),
        RiskLevel::new(45.0, 59.0, "G3a", Severity::Warning)
            .describe("Mildly to moderately decreased"),
        RiskLevel::new(60.0, 89.0, "G2", Severity::Info).describe("Mildly decreased"),
        RiskLevel::new(90.0, 1000.0, "G1", Severity::Success).describe("Normal or high"),
    ]
});

/// CKD-EPI 2021 creatinine equation, without the race coefficient.
pub fn egfr(creatinine_mg_dl: f64, age: f64, female: bool) -> f64 {
    let (kappa, alpha) = if female { (0.7, -0.241) } else { (0.9, -0.302) };
    let ratio = creatinine_mg_dl / kappa;
    let sex_factor = if female { 1.012 } else { 1.0 };
    142.0 * ratio.min(1.0).powf(alpha) * ratio.max(1.0).powf(-1.200) * 0.9938_f64.powf(age) * sex_factor
}

pub fn config() -> CalculatorConfig {
    let layout = Layout::Inputs(vec![
        InputSpec::number("ckd-epi-creatinine", "Serum creatinine")
            .toggle("creatinine", "mg/dL", &["mg/dL", "µmol/L"])
            .observation("2160-0"),
        InputSpec::number("ckd-epi-age", "Age")
            .unit("years")
            .bounds(18.0, 120.0)
            .observation(SUBJECT_AGE),
        InputSpec::radio(
            "ckd-epi-sex",
            "Sex",
            vec![
                ChoiceOption::new("male", "Male"),
                ChoiceOption::new("female", "Female"),
            ],
        )
        .observation(SUBJECT_SEX),
    ]);

    CalculatorConfig::complex(ID, "CKD-EPI eGFR (2021)", layout, |r| {
        let creatinine = r.standard_value("ckd-epi-creatinine")?;
        let age = r.value("ckd-epi-age")?;
        let female = match r.radio("ckd-epi-sex")?.as_str() {
            "female" => true,
            "male" => false,
            _ => return None,
        };
        if creatinine <= 0.0 || age < 18.0 {
            return None;
        }
        let gfr = round_to(egfr(creatinine, age, female), 0);
        Some(
            ComplexOutcome::new(vec![
                ResultItem::new("eGFR", gfr).unit("mL/min/1.73m²"),
            ])
            .classify_on(gfr),
        )
    })
    .describe("Estimated glomerular filtration rate for adults.")
    .risk_levels(STAGES.clone())
    .formula(
        FormulaDisplay::formulas(&[(
            "eGFR",
            "142 × min(Scr/κ, 1)^α × max(Scr/κ, 1)^-1.200 × 0.9938^age × 1.012 [if female]",
        )])
        .note("κ = 0.7 (female) or 0.9 (male); α = -0.241 (female) or -0.302 (male); Scr in mg/dL.")
        .interpretation("≥ 90", "G1: normal or high", Some(Severity::Success))
        .interpretation("60 - 89", "G2: mildly decreased", Some(Severity::Info))
        .interpretation("45 - 59", "G3a: mildly to moderately decreased", Some(Severity::Warning))
        .interpretation("30 - 44", "G3b: moderately to severely decreased", Some(Severity::Warning))
        .interpretation("15 - 29", "G4: severely decreased", Some(Severity::Danger))
        .interpretation("< 15", "G5: kidney failure", Some(Severity::Danger)),
    )
    .reference("Inker LA, et al. New creatinine- and cystatin C-based equations to estimate GFR without race. N Engl J Med. 2021;385(19):1737-1749.")
}
