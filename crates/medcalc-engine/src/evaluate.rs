use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use medcalc_core::models::input::{InputKind, Layout};
use medcalc_core::models::result::ResultItem;
use medcalc_core::models::severity::Severity;

use crate::hooks::guard;
use crate::resolver::{Resolver, Values};

/// Direct formula: every input's value in, result rows out.
pub type SimpleFn = dyn Fn(&Values) -> Option<Vec<ResultItem>> + Send + Sync;

/// Multi-step formula with access to the live resolver.
pub type ComplexFn = dyn Fn(&Resolver<'_>) -> Option<ComplexOutcome> + Send + Sync;

/// Custom point rule for score calculators mixing numbers and options.
pub type TallyFn = dyn Fn(&Values) -> Option<f64> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Mode {
    Simple,
    Complex,
    Score,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Mode::Simple => "simple",
            Mode::Complex => "complex",
            Mode::Score => "score",
        })
    }
}

#[derive(Clone)]
pub enum ScoreRule {
    /// Add up the numeric values of selected and checked options.
    Sum,
    Tally(Arc<TallyFn>),
}

#[derive(Clone)]
pub enum Evaluator {
    Simple(Arc<SimpleFn>),
    Complex(Arc<ComplexFn>),
    Score(ScoreRule),
}

impl Evaluator {
    pub fn mode(&self) -> Mode {
        match self {
            Evaluator::Simple(_) => Mode::Simple,
            Evaluator::Complex(_) => Mode::Complex,
            Evaluator::Score(_) => Mode::Score,
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::Score(ScoreRule::Sum) => f.write_str("Score(Sum)"),
            Evaluator::Score(ScoreRule::Tally(_)) => f.write_str("Score(Tally)"),
            other => write!(f, "{}", other.mode()),
        }
    }
}

/// What a complex evaluator returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexOutcome {
    pub results: Vec<ResultItem>,
    pub interpretation: Option<String>,
    pub severity: Option<Severity>,
    /// Value to classify against the risk table when no interpretation is
    /// given.
    pub score: Option<f64>,
}

impl ComplexOutcome {
    pub fn new(results: Vec<ResultItem>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn interpret(mut self, interpretation: &str, severity: Severity) -> Self {
        self.interpretation = Some(interpretation.to_string());
        self.severity = Some(severity);
        self
    }

    pub fn classify_on(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Score total with each group's contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub total: f64,
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Items(Vec<ResultItem>),
    Bundle(ComplexOutcome),
    Score(ScoreOutcome),
}

impl Outcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            Outcome::Items(_) => None,
            Outcome::Bundle(bundle) => bundle.score,
            Outcome::Score(score) => Some(score.total),
        }
    }

    /// Rows produced by the evaluator itself, before classification.
    pub fn items(&self) -> &[ResultItem] {
        match self {
            Outcome::Items(items) => items,
            Outcome::Bundle(bundle) => &bundle.results,
            Outcome::Score(_) => &[],
        }
    }

    pub fn breakdown(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Outcome::Score(score) => Some(&score.breakdown),
            _ => None,
        }
    }
}

/// Runs the evaluator against the current field values.
///
/// `None` means there is nothing to show yet: missing required input, a
/// domain precondition that does not hold, or an evaluator that panicked.
pub fn evaluate(
    calculator: &str,
    evaluator: &Evaluator,
    layout: &Layout,
    resolver: &Resolver<'_>,
) -> Option<Outcome> {
    match evaluator {
        Evaluator::Simple(formula) => {
            let values = resolver.values();
            if !required_present(layout, &values) {
                return None;
            }
            let items = guard(calculator, "calculate", || Ok(formula(&values)))??;
            (!items.is_empty()).then_some(Outcome::Items(items))
        }
        Evaluator::Complex(formula) => {
            guard(calculator, "complex_calculate", || Ok(formula(resolver)))?.map(Outcome::Bundle)
        }
        Evaluator::Score(rule) => {
            let values = resolver.values();
            let tallied = option_points(calculator, layout, &values);
            let total = match rule {
                ScoreRule::Sum => tallied.complete.then_some(tallied.total)?,
                ScoreRule::Tally(tally) => guard(calculator, "tally", || Ok(tally(&values)))??,
            };
            Some(Outcome::Score(ScoreOutcome {
                total,
                breakdown: tallied.breakdown,
            }))
        }
    }
}

fn required_present(layout: &Layout, values: &Values) -> bool {
    layout.fields().filter(|field| values.shows(field)).all(|field| match field.kind {
        InputKind::Number | InputKind::Radio | InputKind::Select if field.required => {
            !values.is_missing(&field.id)
        }
        _ => true,
    })
}

struct Tallied {
    total: f64,
    breakdown: BTreeMap<String, f64>,
    /// Every visible required single-choice group has a selection.
    complete: bool,
}

fn option_points(calculator: &str, layout: &Layout, values: &Values) -> Tallied {
    let mut tallied = Tallied {
        total: 0.0,
        breakdown: BTreeMap::new(),
        complete: true,
    };
    for field in layout.fields().filter(|field| values.shows(field)) {
        let points = match field.kind {
            InputKind::Number => continue,
            InputKind::Radio | InputKind::Select => match values.text(&field.id) {
                Some(selected) => points(calculator, &field.id, selected),
                None if field.required => {
                    tallied.complete = false;
                    continue;
                }
                None => 0.0,
            },
            InputKind::Checkbox => values
                .checked(&field.id)
                .iter()
                .map(|value| points(calculator, &field.id, value))
                .sum(),
        };
        tallied.total += points;
        tallied.breakdown.insert(field.id.clone(), points);
    }
    tallied
}

fn points(calculator: &str, group: &str, value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(points) if points.is_finite() => points,
        _ => {
            warn!(calculator, group, value, "non-numeric option value scored as 0");
            0.0
        }
    }
}
