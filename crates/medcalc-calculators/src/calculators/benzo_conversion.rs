use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::{ChoiceOption, InputSpec, Layout};
use medcalc_core::models::result::{ResultItem, round_to};
use medcalc_core::models::severity::Severity;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::evaluate::ComplexOutcome;

pub const ID: &str = "benzo-conversion";

/// A benzodiazepine and its oral dose equivalent to diazepam 10 mg.
pub struct Benzodiazepine {
    pub id: &'static str,
    pub name: &'static str,
    pub equivalent_mg: f64,
    pub duration: &'static str,
}

pub static BENZODIAZEPINES: [Benzodiazepine; 8] = [
    Benzodiazepine { id: "alprazolam", name: "Alprazolam (Xanax)", equivalent_mg: 0.5, duration: "Short" },
    Benzodiazepine { id: "chlordiazepoxide", name: "Chlordiazepoxide (Librium)", equivalent_mg: 25.0, duration: "Long" },
    Benzodiazepine { id: "diazepam", name: "Diazepam (Valium)", equivalent_mg: 10.0, duration: "Long" },
    Benzodiazepine { id: "clonazepam", name: "Clonazepam (Klonopin)", equivalent_mg: 0.5, duration: "Long" },
    Benzodiazepine { id: "lorazepam", name: "Lorazepam (Ativan)", equivalent_mg: 1.0, duration: "Intermediate" },
    Benzodiazepine { id: "oxazepam", name: "Oxazepam (Serax)", equivalent_mg: 20.0, duration: "Short" },
    Benzodiazepine { id: "temazepam", name: "Temazepam (Restoril)", equivalent_mg: 20.0, duration: "Intermediate" },
    Benzodiazepine { id: "triazolam", name: "Triazolam (Halcion)", equivalent_mg: 0.25, duration: "Short" },
];

fn find(id: &str) -> Option<&'static Benzodiazepine> {
    BENZODIAZEPINES.iter().find(|drug| drug.id == id)
}

/// Dose of `to` equivalent to `dose_mg` of `from`.
pub fn equivalent(from: &str, to: &str, dose_mg: f64) -> Option<f64> {
    let from = find(from)?;
    let to = find(to)?;
    Some(dose_mg / from.equivalent_mg * to.equivalent_mg)
}

fn drugs(default: &str) -> Vec<ChoiceOption> {
    BENZODIAZEPINES
        .iter()
        .map(|drug| {
            let option = ChoiceOption::new(drug.id, drug.name);
            if drug.id == default { option.checked() } else { option }
        })
        .collect()
}

/// Oral benzodiazepine dose equivalence through the diazepam-equivalent
/// table.
pub fn config() -> CalculatorConfig {
    let layout = Layout::Inputs(vec![
        InputSpec::select("benzo-from", "Converting from", drugs("lorazepam")),
        InputSpec::number("benzo-dose", "Total daily dose")
            .unit("mg")
            .bounds(0.0, 1000.0)
            .step(0.25),
        InputSpec::select("benzo-to", "Converting to", drugs("diazepam")),
    ]);

    let mut formula = FormulaDisplay::formulas(&[(
        "Equivalent dose",
        "dose × (target equivalent ÷ source equivalent)",
    )])
    .note("Equivalents are oral doses comparable to diazepam 10 mg.")
    .footnote("Equipotent doses vary widely between references; reduce the calculated dose when switching and titrate to response.");
    for drug in &BENZODIAZEPINES {
        formula = formula.criterion(
            &format!("{} ({} acting)", drug.name, drug.duration.to_lowercase()),
            &format!("{} mg", drug.equivalent_mg),
        );
    }

    CalculatorConfig::complex(ID, "Benzodiazepine Conversion Calculator", layout, |r| {
        let dose = r.value("benzo-dose")?;
        if dose <= 0.0 {
            return None;
        }
        let from = r.radio("benzo-from")?;
        let to = r.radio("benzo-to")?;
        let converted = round_to(equivalent(&from, &to, dose)?, 2);
        let target = find(&to)?;
        let outcome = ComplexOutcome::new(vec![
            ResultItem::new("Equivalent dose", converted)
                .unit("mg")
                .interpretation(target.name),
        ]);
        Some(if from == to {
            outcome.interpret("Same drug selected; no conversion needed.", Severity::Info)
        } else {
            outcome.interpret(
                "Approximate equivalent. Not for benzodiazepine-naive patients; consider a dose reduction for incomplete cross-tolerance.",
                Severity::Warning,
            )
        })
    })
    .describe("Equivalent doses between oral benzodiazepines.")
    .info("Do not use to calculate an initial dose for a benzodiazepine-naive patient.")
    .formula(formula)
    .reference("Ashton H. Benzodiazepines: how they work and how to withdraw (The Ashton Manual). 2002.")
}
