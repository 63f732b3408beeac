use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{InputSpec, Layout, Section};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;

pub const ID: &str = "fena";

/// Fractional excretion of sodium.
pub fn config() -> CalculatorConfig {
    let layout = Layout::Sections(vec![
        Section::new(
            "Serum",
            vec![
                InputSpec::number("fena-serum-sodium", "Serum sodium")
                    .unit("mEq/L")
                    .bounds(100.0, 200.0)
                    .observation("2951-2"),
                InputSpec::number("fena-serum-creatinine", "Serum creatinine")
                    .toggle("creatinine", "mg/dL", &["mg/dL", "µmol/L"])
                    .observation("2160-0"),
            ],
        ),
        Section::new(
            "Urine",
            vec![
                InputSpec::number("fena-urine-sodium", "Urine sodium")
                    .unit("mEq/L")
                    .observation("2955-3"),
                InputSpec::number("fena-urine-creatinine", "Urine creatinine")
                    .toggle("creatinine", "mg/dL", &["mg/dL", "µmol/L"])
                    .observation("2161-8"),
            ],
        )
        .subtitle("Spot sample collected at the same time as the serum"),
    ]);

    CalculatorConfig::simple(ID, "Fractional Excretion of Sodium (FENa)", layout, |values| {
        let serum_na = values.number("fena-serum-sodium")?;
        let serum_cr = values.number("fena-serum-creatinine")?;
        let urine_na = values.number("fena-urine-sodium")?;
        let urine_cr = values.number("fena-urine-creatinine")?;

        let denominator = serum_na * urine_cr;
        if denominator <= 0.0 {
            return None;
        }
        let fena = urine_na * serum_cr / denominator * 100.0;
        let (reading, severity) = match fena {
            f if f < 1.0 => ("Prerenal", Severity::Info),
            f if f <= 2.0 => ("Indeterminate", Severity::Warning),
            _ => ("Intrinsic renal (e.g. acute tubular necrosis)", Severity::Danger),
        };
        Some(vec![
            ResultItem::new("FENa", round_to(fena, 2))
                .unit("%")
                .interpretation(reading)
                .severity(severity),
        ])
    })
    .info("Unreliable in patients on diuretics; consider fractional excretion of urea instead.")
    .formula(
        FormulaDisplay::formulas(&[(
            "FENa",
            "(urine Na × serum Cr) / (serum Na × urine Cr) × 100",
        )])
        .interpretation("< 1%", "Prerenal", Some(Severity::Info))
        .interpretation("1 - 2%", "Indeterminate", Some(Severity::Warning))
        .interpretation("> 2%", "Intrinsic renal", Some(Severity::Danger)),
    )
    .reference("Espinel CH. The FENa test: use in the differential diagnosis of acute renal failure. JAMA. 1976;236(6):579-581.")
}
