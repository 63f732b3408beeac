use serde::Serialize;
use tracing::warn;

use medcalc_core::models::risk::RiskLevel;

/// First level, in table order, whose closed range contains `score`.
pub fn classify(score: f64, table: &[RiskLevel]) -> Option<&RiskLevel> {
    table.iter().find(|level| level.contains(score))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableIssue {
    /// Two levels share at least one score. The earlier one wins.
    Overlap {
        first: String,
        second: String,
        from: f64,
        to: f64,
    },
    /// A level starts below the one before it.
    OutOfOrder { level: String, previous: String },
    /// `min_score` is greater than `max_score`; the level never matches.
    Inverted { level: String },
}

/// Problems in a risk table. Reported, never corrected.
pub fn overlaps(table: &[RiskLevel]) -> Vec<TableIssue> {
    let mut issues = Vec::new();
    for (index, level) in table.iter().enumerate() {
        if level.min_score > level.max_score {
            issues.push(TableIssue::Inverted {
                level: level.label.clone(),
            });
        }
        if let Some(previous) = index.checked_sub(1).and_then(|i| table.get(i))
            && level.min_score < previous.min_score
        {
            issues.push(TableIssue::OutOfOrder {
                level: level.label.clone(),
                previous: previous.label.clone(),
            });
        }
        for later in &table[index + 1..] {
            if level.overlaps(later) {
                issues.push(TableIssue::Overlap {
                    first: level.label.clone(),
                    second: later.label.clone(),
                    from: level.min_score.max(later.min_score),
                    to: level.max_score.min(later.max_score),
                });
            }
        }
    }
    issues
}

/// Logs every issue in `table` at warn level and returns how many there were.
pub fn lint(calculator: &str, table: &[RiskLevel]) -> usize {
    let issues = overlaps(table);
    for issue in &issues {
        match issue {
            TableIssue::Overlap {
                first,
                second,
                from,
                to,
            } => warn!(calculator, %first, %second, from, to, "risk levels overlap; first match wins"),
            TableIssue::OutOfOrder { level, previous } => {
                warn!(calculator, %level, %previous, "risk levels out of order")
            }
            TableIssue::Inverted { level } => warn!(calculator, %level, "risk level range is inverted"),
        }
    }
    issues.len()
}
