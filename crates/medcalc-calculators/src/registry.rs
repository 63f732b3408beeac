use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use medcalc_engine::compile::{Engine, RuntimeUnit};
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::evaluate::Mode;

use crate::calculators::all_calculators;
use crate::error::RegistryError;

/// Catalog entry as shown to a host picking a calculator.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CalculatorSummary {
    pub id: String,
    pub title: String,
    pub mode: Mode,
    pub description: Option<String>,
    pub fields: usize,
    pub risk_levels: usize,
}

impl From<&CalculatorConfig> for CalculatorSummary {
    fn from(config: &CalculatorConfig) -> Self {
        Self {
            id: config.id.clone(),
            title: config.title.clone(),
            mode: config.mode(),
            description: config.description.clone(),
            fields: config.layout.fields().count(),
            risk_levels: config.risk_levels.len(),
        }
    }
}

/// Calculator configurations by id, in registration order.
///
/// Built once by the host and passed around by reference.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Arc<CalculatorConfig>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in calculator.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for config in all_calculators() {
            registry.register(config)?;
        }
        debug!(calculators = registry.len(), "built-in registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, config: CalculatorConfig) -> Result<(), RegistryError> {
        if self.entries.iter().any(|entry| entry.id == config.id) {
            return Err(RegistryError::DuplicateId(config.id));
        }
        self.entries.push(Arc::new(config));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Arc<CalculatorConfig>, RegistryError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCalculator(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CalculatorConfig>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summaries(&self) -> Vec<CalculatorSummary> {
        self.entries
            .iter()
            .map(|entry| CalculatorSummary::from(entry.as_ref()))
            .collect()
    }

    pub fn compile(&self, engine: &Engine, id: &str) -> Result<RuntimeUnit, RegistryError> {
        Ok(engine.compile(self.get(id)?)?)
    }

    pub fn compile_all(&self, engine: &Engine) -> Result<Vec<RuntimeUnit>, RegistryError> {
        self.entries
            .iter()
            .map(|entry| Ok(engine.compile(Arc::clone(entry))?))
            .collect()
    }
}
