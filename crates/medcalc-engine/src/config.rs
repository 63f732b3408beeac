use std::fmt;
use std::sync::Arc;

use medcalc_core::models::formula::FormulaDisplay;
use medcalc_core::models::input::Layout;
use medcalc_core::models::result::ResultItem;
use medcalc_core::models::risk::RiskLevel;
use medcalc_record::source::BoxFuture;
use medcalc_record::subject::Subject;

use crate::error::HookError;
use crate::evaluate::{ComplexOutcome, Evaluator, Mode, ScoreRule};
use crate::fragment::Fragment;
use crate::hooks::{CustomInitialize, CustomRenderer, PrefillContext, PrefillHook, RenderInput};
use crate::resolver::{Resolver, Values};

/// Immutable description of one calculator.
///
/// Built once, usually at startup, and shared behind an `Arc`.
#[derive(Clone)]
pub struct CalculatorConfig {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub layout: Layout,
    pub evaluator: Evaluator,
    /// Ordered; the first containing range wins.
    pub risk_levels: Vec<RiskLevel>,
    pub formula: FormulaDisplay,
    /// Shown as an info call-out above the inputs.
    pub info: Option<String>,
    pub references: Vec<String>,
    pub renderer: Option<Arc<CustomRenderer>>,
    pub initialize: Option<Arc<CustomInitialize>>,
    pub prefill: Option<Arc<PrefillHook>>,
}

impl CalculatorConfig {
    fn base(id: &str, title: &str, layout: Layout, evaluator: Evaluator) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            layout,
            evaluator,
            risk_levels: Vec::new(),
            formula: FormulaDisplay::default(),
            info: None,
            references: Vec::new(),
            renderer: None,
            initialize: None,
            prefill: None,
        }
    }

    pub fn simple<F>(id: &str, title: &str, layout: Layout, calculate: F) -> Self
    where
        F: Fn(&Values) -> Option<Vec<ResultItem>> + Send + Sync + 'static,
    {
        Self::base(id, title, layout, Evaluator::Simple(Arc::new(calculate)))
    }

    pub fn complex<F>(id: &str, title: &str, layout: Layout, calculate: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Option<ComplexOutcome> + Send + Sync + 'static,
    {
        Self::base(id, title, layout, Evaluator::Complex(Arc::new(calculate)))
    }

    /// Point score summing the selected option values.
    pub fn score(id: &str, title: &str, layout: Layout) -> Self {
        Self::base(id, title, layout, Evaluator::Score(ScoreRule::Sum))
    }

    /// Replaces the option sum of a score calculator with a custom tally.
    pub fn tally<F>(mut self, tally: F) -> Self
    where
        F: Fn(&Values) -> Option<f64> + Send + Sync + 'static,
    {
        self.evaluator = Evaluator::Score(ScoreRule::Tally(Arc::new(tally)));
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn risk_levels(mut self, levels: Vec<RiskLevel>) -> Self {
        self.risk_levels = levels;
        self
    }

    pub fn formula(mut self, formula: FormulaDisplay) -> Self {
        self.formula = formula;
        self
    }

    pub fn info(mut self, text: &str) -> Self {
        self.info = Some(text.to_string());
        self
    }

    pub fn reference(mut self, citation: &str) -> Self {
        self.references.push(citation.to_string());
        self
    }

    pub fn render_with<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&RenderInput<'_>) -> Result<String, HookError> + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn initialize_with<F>(mut self, initialize: F) -> Self
    where
        F: Fn(&Fragment, &Subject) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.initialize = Some(Arc::new(initialize));
        self
    }

    pub fn prefill_with<F>(mut self, prefill: F) -> Self
    where
        F: Fn(PrefillContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync + 'static,
    {
        self.prefill = Some(Arc::new(prefill));
        self
    }

    pub fn mode(&self) -> Mode {
        self.evaluator.mode()
    }

    /// Ids of every declared field, i.e. everything a change listener tracks.
    pub fn field_ids(&self) -> Vec<String> {
        self.layout.fields().map(|f| f.id.clone()).collect()
    }
}

impl fmt::Debug for CalculatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorConfig")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("evaluator", &self.evaluator)
            .field("fields", &self.field_ids())
            .field("risk_levels", &self.risk_levels.len())
            .field("custom_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}
