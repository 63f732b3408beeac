//! Unit conversion service.
//!
//! Conversions are grouped by measurement family. Every unsupported pair
//! yields `None`; nothing here panics or returns an error.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Converts values between units of one measurement family.
pub trait UnitConversion: Send + Sync {
    fn convert(&self, value: f64, from: &str, to: &str, measurement: &str) -> Option<f64>;

    /// Decimal places used when a converted value is shown in `unit`.
    fn display_decimals(&self, measurement: &str, unit: &str) -> usize {
        let _ = (measurement, unit);
        2
    }
}

#[derive(Clone, Copy)]
enum Rule {
    Factor(f64),
    Map(fn(f64) -> f64),
}

/// `from unit -> to unit -> rule`
type Family = HashMap<&'static str, HashMap<&'static str, Rule>>;

fn family(pairs: &[(&'static str, &'static str, f64)]) -> Family {
    let mut family = Family::new();
    for &(from, to, factor) in pairs {
        family.entry(from).or_default().insert(to, Rule::Factor(factor));
    }
    family
}

static FAMILIES: LazyLock<HashMap<&'static str, Family>> = LazyLock::new(|| {
    let mut families = HashMap::new();

    families.insert(
        "weight",
        family(&[
            ("kg", "lbs", 2.20462),
            ("kg", "g", 1000.0),
            ("lbs", "kg", 0.453592),
            ("lbs", "g", 453.592),
            ("g", "kg", 0.001),
            ("g", "lbs", 0.00220462),
        ]),
    );
    families.insert(
        "height",
        family(&[
            ("cm", "in", 0.393701),
            ("cm", "ft", 0.0328084),
            ("cm", "m", 0.01),
            ("in", "cm", 2.54),
            ("in", "ft", 1.0 / 12.0),
            ("in", "m", 0.0254),
            ("ft", "cm", 30.48),
            ("ft", "in", 12.0),
            ("ft", "m", 0.3048),
            ("m", "cm", 100.0),
            ("m", "in", 39.3701),
            ("m", "ft", 3.28084),
        ]),
    );

    let temperature: [(&'static str, &'static str, fn(f64) -> f64); 6] = [
        ("C", "F", |c| c * 9.0 / 5.0 + 32.0),
        ("C", "K", |c| c + 273.15),
        ("F", "C", |f| (f - 32.0) * 5.0 / 9.0),
        ("F", "K", |f| (f - 32.0) * 5.0 / 9.0 + 273.15),
        ("K", "C", |k| k - 273.15),
        ("K", "F", |k| (k - 273.15) * 9.0 / 5.0 + 32.0),
    ];
    let mut temperatures = Family::new();
    for (from, to, map) in temperature {
        temperatures.entry(from).or_default().insert(to, Rule::Map(map));
    }
    families.insert("temperature", temperatures);

    families.insert(
        "pressure",
        family(&[
            ("mmHg", "kPa", 0.133322),
            ("kPa", "mmHg", 7.50062),
            ("mmHg", "mm[Hg]", 1.0),
            ("mm[Hg]", "mmHg", 1.0),
            ("mm[Hg]", "kPa", 0.133322),
            ("kPa", "mm[Hg]", 7.50062),
        ]),
    );
    families.insert(
        "volume",
        family(&[
            ("mL", "L", 0.001),
            ("L", "mL", 1000.0),
        ]),
    );
    families.insert(
        "glucose",
        family(&[("mg/dL", "mmol/L", 0.0555), ("mmol/L", "mg/dL", 18.018)]),
    );
    families.insert(
        "creatinine",
        family(&[
            ("mg/dL", "µmol/L", 88.4),
            ("mg/dL", "umol/L", 88.4),
            ("µmol/L", "mg/dL", 1.0 / 88.4),
            ("umol/L", "mg/dL", 1.0 / 88.4),
        ]),
    );
    families.insert(
        "calcium",
        family(&[("mg/dL", "mmol/L", 0.2495), ("mmol/L", "mg/dL", 4.008)]),
    );
    families.insert(
        "albumin",
        family(&[("g/dL", "g/L", 10.0), ("g/L", "g/dL", 0.1)]),
    );
    families.insert(
        "bilirubin",
        family(&[
            ("mg/dL", "µmol/L", 17.1),
            ("mg/dL", "umol/L", 17.1),
            ("µmol/L", "mg/dL", 1.0 / 17.1),
            ("umol/L", "mg/dL", 1.0 / 17.1),
        ]),
    );
    families.insert(
        "hemoglobin",
        family(&[
            ("g/dL", "g/L", 10.0),
            ("g/L", "g/dL", 0.1),
            ("g/dL", "mmol/L", 0.6206),
            ("mmol/L", "g/dL", 1.611),
        ]),
    );
    families.insert(
        "bun",
        family(&[("mg/dL", "mmol/L", 0.357), ("mmol/L", "mg/dL", 2.801)]),
    );
    families.insert(
        "electrolyte",
        family(&[("mEq/L", "mmol/L", 1.0), ("mmol/L", "mEq/L", 1.0)]),
    );
    families.insert(
        "cholesterol",
        family(&[("mg/dL", "mmol/L", 0.02586), ("mmol/L", "mg/dL", 38.67)]),
    );
    families.insert(
        "triglycerides",
        family(&[("mg/dL", "mmol/L", 0.01129), ("mmol/L", "mg/dL", 88.57)]),
    );

    families
});

static DECIMALS: LazyLock<HashMap<&'static str, HashMap<&'static str, usize>>> =
    LazyLock::new(|| {
        let rows: [(&'static str, &'static str, usize); 31] = [
            ("weight", "kg", 1),
            ("weight", "lbs", 1),
            ("weight", "g", 0),
            ("height", "cm", 1),
            ("height", "in", 1),
            ("height", "ft", 2),
            ("height", "m", 2),
            ("temperature", "C", 1),
            ("temperature", "F", 1),
            ("temperature", "K", 1),
            ("pressure", "mmHg", 0),
            ("pressure", "mm[Hg]", 0),
            ("pressure", "kPa", 2),
            ("volume", "mL", 0),
            ("volume", "L", 2),
            ("glucose", "mg/dL", 0),
            ("glucose", "mmol/L", 1),
            ("creatinine", "mg/dL", 2),
            ("creatinine", "µmol/L", 0),
            ("creatinine", "umol/L", 0),
            ("calcium", "mg/dL", 2),
            ("calcium", "mmol/L", 2),
            ("albumin", "g/dL", 1),
            ("albumin", "g/L", 0),
            ("bilirubin", "mg/dL", 1),
            ("bilirubin", "µmol/L", 0),
            ("bilirubin", "umol/L", 0),
            ("cholesterol", "mg/dL", 0),
            ("cholesterol", "mmol/L", 2),
            ("triglycerides", "mg/dL", 0),
            ("triglycerides", "mmol/L", 2),
        ];
        let mut decimals: HashMap<&'static str, HashMap<&'static str, usize>> = HashMap::new();
        for (measurement, unit, places) in rows {
            decimals.entry(measurement).or_default().insert(unit, places);
        }
        decimals
    });

/// Built-in conversion table for the measurement families calculators use.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUnits;

impl StandardUnits {
    /// Measurement families this converter knows about.
    pub fn measurements(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = FAMILIES.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl UnitConversion for StandardUnits {
    fn convert(&self, value: f64, from: &str, to: &str, measurement: &str) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        if from == to {
            return Some(value);
        }
        let rule = FAMILIES.get(measurement)?.get(from)?.get(to)?;
        let converted = match *rule {
            Rule::Factor(factor) => value * factor,
            Rule::Map(map) => map(value),
        };
        converted.is_finite().then_some(converted)
    }

    fn display_decimals(&self, measurement: &str, unit: &str) -> usize {
        DECIMALS
            .get(measurement)
            .and_then(|units| units.get(unit))
            .copied()
            .unwrap_or(2)
    }
}
