use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use medcalc_core::models::input::InputKind;
use medcalc_core::models::severity::Severity;
use medcalc_core::units::{StandardUnits, UnitConversion};
use medcalc_widgets::render::{Shell, Widgets};

use crate::classify;
use crate::config::CalculatorConfig;
use crate::error::EngineError;
use crate::evaluate::{Evaluator, Mode, Outcome, ScoreRule, evaluate};
use crate::fragment::Fragment;
use crate::history::{History, SessionHistory};
use crate::render::{Presentation, present};
use crate::resolver::Resolver;
use crate::settings::EngineSettings;

/// Compiles calculator configurations into runtime units.
///
/// Owns the collaborators every unit shares: markup widgets, the unit
/// converter, the session history and the settings.
pub struct Engine {
    widgets: Arc<Widgets>,
    units: Arc<dyn UnitConversion>,
    history: Arc<dyn History>,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        Ok(Self {
            widgets: Arc::new(Widgets::new()?),
            units: Arc::new(StandardUnits),
            history: Arc::new(SessionHistory::new(settings.history_limit)),
            settings,
        })
    }

    pub fn with_units(mut self, units: Arc<dyn UnitConversion>) -> Self {
        self.units = units;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    pub fn units(&self) -> &Arc<dyn UnitConversion> {
        &self.units
    }

    pub fn compile(&self, config: Arc<CalculatorConfig>) -> Result<RuntimeUnit, EngineError> {
        validate(&config)?;
        classify::lint(&config.id, &config.risk_levels);
        debug!(calculator = %config.id, mode = %config.mode(), "calculator compiled");
        Ok(RuntimeUnit {
            compiled: Arc::new(Compiled {
                config,
                widgets: Arc::clone(&self.widgets),
                units: Arc::clone(&self.units),
                history: Arc::clone(&self.history),
                settings: self.settings.clone(),
            }),
        })
    }
}

fn validate(config: &CalculatorConfig) -> Result<(), EngineError> {
    let invalid = |reason: String| EngineError::InvalidConfig {
        calculator: config.id.clone(),
        reason,
    };
    if config.id.trim().is_empty() {
        return Err(invalid("empty id".to_string()));
    }

    let mut seen = BTreeSet::new();
    let mut option_groups = 0;
    for field in config.layout.fields() {
        if !seen.insert(field.id.clone()) {
            return Err(invalid(format!("duplicate field '{}'", field.id)));
        }
        match field.kind {
            InputKind::Number => {
                if let Some(toggle) = &field.unit_toggle {
                    if !toggle.units.contains(&toggle.default) {
                        return Err(invalid(format!(
                            "field '{}' defaults to unit '{}' outside its toggle",
                            field.id, toggle.default
                        )));
                    }
                    if let Some(standard) = &field.standard_unit
                        && !toggle.units.contains(standard)
                    {
                        return Err(invalid(format!(
                            "field '{}' standard unit '{standard}' outside its toggle",
                            field.id
                        )));
                    }
                }
            }
            InputKind::Radio | InputKind::Select => {
                if field.options.is_empty() {
                    return Err(invalid(format!("group '{}' has no options", field.id)));
                }
                option_groups += 1;
            }
            InputKind::Checkbox => {
                if field.options.is_empty() {
                    return Err(invalid(format!("group '{}' has no options", field.id)));
                }
                // Options are addressed by element id across the whole fragment.
                for id in field.option_ids() {
                    if !seen.insert(id.clone()) {
                        return Err(invalid(format!(
                            "option id '{id}' in group '{}' is already in use",
                            field.id
                        )));
                    }
                }
                option_groups += 1;
            }
        }
    }

    for field in config.layout.fields() {
        let Some(rule) = &field.visible_when else {
            continue;
        };
        let controls = config.layout.field(&rule.field);
        if rule.field == field.id || !controls.is_some_and(|c| c.kind.is_single_choice()) {
            return Err(invalid(format!(
                "field '{}' is shown by '{}', which is not a radio or select group",
                field.id, rule.field
            )));
        }
    }

    if matches!(config.evaluator, Evaluator::Score(ScoreRule::Sum)) && option_groups == 0 {
        return Err(invalid("score calculator without option groups".to_string()));
    }
    Ok(())
}

/// A configuration bound to the engine's collaborators.
pub(crate) struct Compiled {
    pub(crate) config: Arc<CalculatorConfig>,
    pub(crate) widgets: Arc<Widgets>,
    pub(crate) units: Arc<dyn UnitConversion>,
    pub(crate) history: Arc<dyn History>,
    pub(crate) settings: EngineSettings,
}

impl Compiled {
    pub(crate) fn evaluate(&self, fragment: &Fragment) -> Option<Outcome> {
        let config = &self.config;
        let resolver = Resolver::new(fragment, &config.layout, self.units.as_ref());
        evaluate(&config.id, &config.evaluator, &config.layout, &resolver)
    }
}

/// A compiled calculator.
///
/// Rendering is pure. Each `attach` wires the given fragment into the
/// recomputation pipeline; units share no mutable state with each other.
#[derive(Clone)]
pub struct RuntimeUnit {
    pub(crate) compiled: Arc<Compiled>,
}

impl std::fmt::Debug for RuntimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeUnit")
            .field("config", &self.compiled.config)
            .finish_non_exhaustive()
    }
}

impl RuntimeUnit {
    pub fn id(&self) -> &str {
        &self.compiled.config.id
    }

    pub fn title(&self) -> &str {
        &self.compiled.config.title
    }

    pub fn mode(&self) -> Mode {
        self.compiled.config.mode()
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.compiled.config
    }

    /// Element id of the result region.
    pub fn result_region_id(&self) -> String {
        format!("{}-result", self.id())
    }

    /// Full markup: inputs with unit toggles, a hidden result region and the
    /// formula documentation. Needs no live context.
    pub fn render(&self) -> Result<String, EngineError> {
        let Compiled {
            config,
            widgets,
            settings,
            ..
        } = self.compiled.as_ref();

        let sections = widgets.layout(&config.layout)?;
        let result_box =
            widgets.result_box(&self.result_region_id(), &settings.result_title, "", false)?;
        let formula = if config.formula.is_empty() {
            None
        } else {
            Some(widgets.formula_section(&config.formula)?)
        };
        let alerts = match &config.info {
            Some(text) => vec![widgets.alert(Severity::Info, text, None)?],
            None => Vec::new(),
        };

        let shell = Shell {
            id: &config.id,
            title: &config.title,
            description: config.description.as_deref(),
            alerts,
            sections,
            result_box,
            formula,
            references: &config.references,
        };
        Ok(widgets.calculator(&shell)?)
    }

    /// Renders the markup and returns the live fragment a host holds after
    /// inserting it: fields at their defaults, result region hidden.
    pub fn mount(&self) -> Result<Fragment, EngineError> {
        let markup = self.render()?;
        Ok(Fragment::from_layout(
            self.id(),
            &self.compiled.config.layout,
            markup,
        ))
    }

    /// Evaluates the fragment's current values without touching it.
    pub fn evaluate(&self, fragment: &Fragment) -> Option<Outcome> {
        self.compiled.evaluate(fragment)
    }

    /// Fields hidden by the fragment's current selections.
    pub fn hidden_fields(&self, fragment: &Fragment) -> Vec<String> {
        let config = &self.compiled.config;
        let values = Resolver::new(fragment, &config.layout, self.compiled.units.as_ref()).values();
        config
            .layout
            .fields()
            .filter(|field| !values.shows(field))
            .map(|field| field.id.clone())
            .collect()
    }

    /// Default result rows for the fragment's current values.
    pub fn present(&self, fragment: &Fragment) -> Option<Presentation> {
        let outcome = self.compiled.evaluate(fragment)?;
        Some(present(&outcome, &self.compiled.config.risk_levels))
    }
}
