use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::severity::Severity;

/// A labeled, severity-tagged closed score range `[min_score, max_score]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskLevel {
    pub min_score: f64,
    pub max_score: f64,
    pub label: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: Option<String>,
}

impl RiskLevel {
    pub fn new(min_score: f64, max_score: f64, label: &str, severity: Severity) -> Self {
        Self {
            min_score,
            max_score,
            label: label.to_string(),
            severity,
            description: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min_score && score <= self.max_score
    }

    /// True when the two closed ranges share at least one point.
    pub fn overlaps(&self, other: &RiskLevel) -> bool {
        self.min_score <= other.max_score && other.min_score <= self.max_score
    }
}
