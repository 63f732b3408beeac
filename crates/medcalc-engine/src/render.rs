use serde::Serialize;

use medcalc_core::models::result::ResultItem;
use medcalc_core::models::risk::RiskLevel;
use medcalc_widgets::error::WidgetError;
use medcalc_widgets::render::Widgets;

use crate::classify::classify;
use crate::evaluate::Outcome;

pub const TOTAL_SCORE_LABEL: &str = "Total Score";

/// Result rows ready to render, plus the level they were classified into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub items: Vec<ResultItem>,
    pub score: Option<f64>,
    pub level: Option<RiskLevel>,
}

impl Presentation {
    /// One-line text form of the headline row, e.g. `"BMI: 22.9 kg/m²"`.
    pub fn summary(&self) -> String {
        let Some(item) = self.items.iter().find(|item| !item.is_alert()) else {
            return self
                .score
                .map(|score| format!("{TOTAL_SCORE_LABEL}: {score}"))
                .unwrap_or_default();
        };
        let mut summary = format!("{}: {}", item.label, item.value);
        if let Some(unit) = &item.unit {
            summary.push(' ');
            summary.push_str(unit);
        }
        if let Some(level) = &self.level {
            summary.push_str(" (");
            summary.push_str(&level.label);
            summary.push(')');
        } else if let Some(interpretation) = &item.interpretation {
            summary.push_str(" (");
            summary.push_str(interpretation);
            summary.push(')');
        }
        summary
    }
}

/// Default rows for an outcome.
///
/// Score totals become a "Total Score" row labelled with the matching risk
/// level; a level's description follows as a call-out. A complex outcome's
/// interpretation is shown as a call-out after its rows, or, when it has
/// none, the value it asked to classify is looked up in the table. Totals
/// outside every range are shown unlabelled.
pub fn present(outcome: &Outcome, table: &[RiskLevel]) -> Presentation {
    match outcome {
        Outcome::Items(items) => Presentation {
            items: items.clone(),
            score: None,
            level: None,
        },
        Outcome::Bundle(bundle) => {
            let mut items = bundle.results.clone();
            let mut level = None;
            if let Some(interpretation) = &bundle.interpretation {
                items.push(ResultItem::alert(
                    bundle.severity.unwrap_or_default(),
                    interpretation,
                ));
            } else if let Some(found) = bundle.score.and_then(|score| classify(score, table)) {
                items.push(level_alert(found));
                level = Some(found.clone());
            }
            Presentation {
                items,
                score: bundle.score,
                level,
            }
        }
        Outcome::Score(score) => {
            let level = classify(score.total, table);
            let mut total = ResultItem::new(TOTAL_SCORE_LABEL, score.total).unit("points");
            if let Some(level) = level {
                total = total.interpretation(&level.label).severity(level.severity);
            }
            let mut items = vec![total];
            if let Some(level) = level
                && let Some(description) = &level.description
            {
                items.push(ResultItem::alert(level.severity, description));
            }
            Presentation {
                items,
                score: Some(score.total),
                level: level.cloned(),
            }
        }
    }
}

fn level_alert(level: &RiskLevel) -> ResultItem {
    let message = match &level.description {
        Some(description) => format!("{}: {}", level.label, description),
        None => level.label.clone(),
    };
    ResultItem::alert(level.severity, &message)
}

pub fn markup(widgets: &Widgets, presentation: &Presentation) -> Result<String, WidgetError> {
    widgets.result_items(&presentation.items)
}
