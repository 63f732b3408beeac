use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::severity::Severity;

/// Human-readable documentation of how a calculator works. Never executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormulaDisplay {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub calculation_note: Option<String>,
    #[serde(default)]
    pub items: Vec<FormulaItem>,
    #[serde(default)]
    pub scoring_criteria: Vec<CriteriaRow>,
    #[serde(default)]
    pub footnotes: Vec<String>,
    #[serde(default)]
    pub interpretation_title: Option<String>,
    #[serde(default)]
    pub table_headers: Vec<String>,
    #[serde(default)]
    pub interpretations: Vec<InterpretationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormulaItem {
    pub label: String,
    pub formula: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CriteriaRow {
    pub criteria: String,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(default)]
    pub is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InterpretationRow {
    pub score: String,
    #[serde(default)]
    pub category: Option<String>,
    pub interpretation: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl FormulaDisplay {
    pub fn formulas(items: &[(&str, &str)]) -> Self {
        Self {
            items: items
                .iter()
                .map(|(label, formula)| FormulaItem {
                    label: label.to_string(),
                    formula: formula.to_string(),
                    notes: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn note(mut self, note: &str) -> Self {
        self.calculation_note = Some(note.to_string());
        self
    }

    pub fn criterion(mut self, criteria: &str, points: &str) -> Self {
        self.scoring_criteria.push(CriteriaRow {
            criteria: criteria.to_string(),
            points: Some(points.to_string()),
            is_header: false,
        });
        self
    }

    pub fn criteria_header(mut self, criteria: &str) -> Self {
        self.scoring_criteria.push(CriteriaRow {
            criteria: criteria.to_string(),
            points: None,
            is_header: true,
        });
        self
    }

    pub fn footnote(mut self, text: &str) -> Self {
        self.footnotes.push(text.to_string());
        self
    }

    pub fn interpretation(
        mut self,
        score: &str,
        interpretation: &str,
        severity: Option<Severity>,
    ) -> Self {
        self.interpretations.push(InterpretationRow {
            score: score.to_string(),
            category: None,
            interpretation: interpretation.to_string(),
            severity,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.scoring_criteria.is_empty()
            && self.interpretations.is_empty()
            && self.footnotes.is_empty()
            && self.calculation_note.is_none()
    }
}
