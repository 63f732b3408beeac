use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::severity::Severity;
use crate::error::CoreError;

/// Label that marks a result item as a call-out rather than a plain row.
pub const ALERT_LABEL: &str = "__ALERT__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Number(n) => write!(f, "{n}"),
            ResultValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ResultValue {
    fn from(value: f64) -> Self {
        ResultValue::Number(value)
    }
}

impl From<&str> for ResultValue {
    fn from(value: &str) -> Self {
        ResultValue::Text(value.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(value: String) -> Self {
        ResultValue::Text(value)
    }
}

/// One line of calculator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultItem {
    pub label: String,
    pub value: ResultValue,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Opaque data for custom renderers.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl ResultItem {
    pub fn new(label: &str, value: impl Into<ResultValue>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            unit: None,
            interpretation: None,
            severity: None,
            payload: None,
        }
    }

    /// A call-out item; `message` is carried as the value.
    pub fn alert(severity: Severity, message: &str) -> Self {
        Self::new(ALERT_LABEL, message).severity(severity)
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn interpretation(mut self, text: &str) -> Self {
        self.interpretation = Some(text.to_string());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, CoreError> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn is_alert(&self) -> bool {
        self.label == ALERT_LABEL
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
