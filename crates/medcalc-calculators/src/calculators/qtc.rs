use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::evaluate::ComplexOutcome;

pub const ID: &str = "qtc";

/// Heart-rate corrected QT interval in ms, by the named correction.
pub fn corrected(method: &str, qt_ms: f64, heart_rate: f64) -> Option<f64> {
    let rr = 60.0 / heart_rate;
    match method {
        "bazett" => Some(qt_ms / rr.sqrt()),
        "fridericia" => Some(qt_ms / rr.cbrt()),
        "framingham" => Some(qt_ms + 154.0 * (1.0 - rr)),
        "hodges" => Some(qt_ms + 1.75 * (heart_rate - 60.0)),
        _ => None,
    }
}

pub fn config() -> CalculatorConfig {
    let layout = Layout::Inputs(vec![
        InputSpec::number("qtc-qt", "QT interval")
            .unit("ms")
            .bounds(200.0, 800.0),
        InputSpec::number("qtc-heart-rate", "Heart rate")
            .unit("bpm")
            .bounds(20.0, 300.0)
            .observation("8867-4"),
        InputSpec::radio(
            "qtc-method",
            "Correction formula",
            vec![
                ChoiceOption::new("bazett", "Bazett").checked(),
                ChoiceOption::new("fridericia", "Fridericia"),
                ChoiceOption::new("framingham", "Framingham"),
                ChoiceOption::new("hodges", "Hodges"),
            ],
        ),
    ]);

    CalculatorConfig::complex(ID, "Corrected QT Interval (QTc)", layout, |r| {
        let qt = r.value("qtc-qt")?;
        let heart_rate = r.value("qtc-heart-rate")?;
        if qt <= 0.0 || heart_rate <= 0.0 {
            return None;
        }
        let method = r.radio("qtc-method")?;
        let qtc = round_to(corrected(&method, qt, heart_rate)?, 0);
        let (reading, severity) = match qtc {
            q if q >= 500.0 => ("Markedly prolonged; high risk of torsades de pointes", Severity::Danger),
            q if q > 460.0 => ("Prolonged", Severity::Warning),
            q if q < 350.0 => ("Short", Severity::Warning),
            _ => ("Within normal limits", Severity::Success),
        };
        Some(
            ComplexOutcome::new(vec![
                ResultItem::new("QTc", qtc).unit("ms"),
                ResultItem::new("RR interval", round_to(60.0 / heart_rate, 3)).unit("s"),
            ])
            .interpret(reading, severity),
        )
    })
    .formula(
        FormulaDisplay::formulas(&[
            ("Bazett", "QT / √RR"),
            ("Fridericia", "QT / ∛RR"),
            ("Framingham", "QT + 154 × (1 - RR)"),
            ("Hodges", "QT + 1.75 × (HR - 60)"),
        ])
        .note("RR = 60 / heart rate, in seconds.")
        .footnote("Bazett over-corrects at high heart rates; Fridericia or Framingham is preferred above 100 bpm."),
    )
    .reference("Bazett HC. An analysis of the time-relations of electrocardiograms. Heart. 1920;7:353-370.")
    .reference("Vandenberk B, et al. Which QT correction formulae to use for QT monitoring? J Am Heart Assoc. 2016;5(6):e003264.")
}
