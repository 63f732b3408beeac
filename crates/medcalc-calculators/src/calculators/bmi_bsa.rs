use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{InputSpec, Layout};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "bmi-bsa";

/// Body mass index with the WHO adult categories, and Mosteller body
/// surface area.
pub fn config() -> CalculatorConfig {
    let layout = Layout::Inputs(vec![
        InputSpec::number("bmi-bsa-weight", "Weight")
            .toggle("weight", "kg", &["kg", "lbs"])
            .placeholder("e.g. 70")
            .bounds(0.5, 500.0)
            .step(0.1)
            .observation("29463-7"),
        InputSpec::number("bmi-bsa-height", "Height")
            .toggle("height", "cm", &["cm", "in"])
            .placeholder("e.g. 175")
            .bounds(30.0, 250.0)
            .step(0.1)
            .observation("8302-2"),
    ]);

    CalculatorConfig::simple(ID, "BMI & Body Surface Area", layout, |values| {
        let weight = values.number("bmi-bsa-weight")?;
        let height = values.number("bmi-bsa-height")?;
        if weight <= 0.0 || height <= 0.0 {
            return None;
        }
        let meters = height / 100.0;
        let bmi = weight / (meters * meters);
        let bsa = (height * weight / 3600.0).sqrt();
        let (category, severity) = category(bmi);
        Some(vec![
            ResultItem::new("Body Mass Index", round_to(bmi, 1))
                .unit("kg/m²")
                .interpretation(category)
                .severity(severity),
            ResultItem::new("Body Surface Area", round_to(bsa, 2)).unit("m²"),
        ])
    })
    .describe("Body mass index and body surface area from height and weight.")
    .formula(
        FormulaDisplay::formulas(&[
            ("BMI", "weight (kg) / height (m)²"),
            ("BSA (Mosteller)", "√(height (cm) × weight (kg) / 3600)"),
        ])
        .interpretation("< 18.5", "Underweight", Some(Severity::Warning))
        .interpretation("18.5 - 24.9", "Normal weight", Some(Severity::Success))
        .interpretation("25 - 29.9", "Overweight", Some(Severity::Warning))
        .interpretation("30 - 34.9", "Obese (Class I)", Some(Severity::Danger))
        .interpretation("35 - 39.9", "Obese (Class II)", Some(Severity::Danger))
        .interpretation("≥ 40", "Obese (Class III)", Some(Severity::Danger)),
    )
    .reference("Mosteller RD. Simplified calculation of body-surface area. N Engl J Med. 1987;317(17):1098.")
    .reference("World Health Organization. Obesity: preventing and managing the global epidemic. WHO Technical Report Series 894. 2000.")
}

fn category(bmi: f64) -> (&'static str, Severity) {
    match bmi {
        b if b < 18.5 => ("Underweight", Severity::Warning),
        b if b < 25.0 => ("Normal weight", Severity::Success),
        b if b < 30.0 => ("Overweight", Severity::Warning),
        b if b < 35.0 => ("Obese (Class I)", Severity::Danger),
        b if b < 40.0 => ("Obese (Class II)", Severity::Danger),
        _ => ("Obese (Class III)", Severity::Danger),
    }
}
