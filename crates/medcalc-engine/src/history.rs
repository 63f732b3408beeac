use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use medcalc_core::models::severity::Severity;

/// A displayed calculator result.
///
/// Emitted through `tracing` whenever a result is shown, and handed to the
/// host's [`History`].
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CalculationEvent {
    pub id: Uuid,
    pub calculator: String,
    /// The fragment the result was shown in.
    pub instance: Uuid,
    pub at: jiff::Timestamp,
    pub score: Option<f64>,
    pub summary: String,
    pub severity: Option<Severity>,
}

impl CalculationEvent {
    pub fn new(calculator: impl Into<String>, instance: Uuid, summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            calculator: calculator.into(),
            instance,
            at: jiff::Timestamp::now(),
            score: None,
            summary: summary.into(),
            severity: None,
        }
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.score = score;
        self
    }

    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = severity;
        self
    }

    /// Same calculator, fragment and displayed result.
    pub fn repeats(&self, other: &CalculationEvent) -> bool {
        self.calculator == other.calculator
            && self.instance == other.instance
            && self.summary == other.summary
            && self.score == other.score
    }

    pub fn emit(&self) {
        info!(
            calculation.calculator = %self.calculator,
            calculation.instance = %self.instance,
            calculation.summary = %self.summary,
            calculation.score = ?self.score,
            calculation.severity = ?self.severity,
            "calculation displayed"
        );
    }
}

/// Where displayed results go beyond the current fragment.
pub trait History: Send + Sync {
    fn record(&self, event: CalculationEvent);

    /// Most recent last.
    fn recent(&self) -> Vec<CalculationEvent>;
}

/// Bounded in-memory history for one session.
///
/// Keeps the newest `limit` events and drops an event that repeats the one
/// before it.
pub struct SessionHistory {
    limit: usize,
    events: Mutex<Vec<CalculationEvent>>,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            events: Mutex::new(Vec::new()),
        }
    }
}

impl History for SessionHistory {
    fn record(&self, event: CalculationEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.last().is_some_and(|last| last.repeats(&event)) {
            return;
        }
        events.push(event);
        if events.len() > self.limit {
            let excess = events.len() - self.limit;
            events.drain(..excess);
        }
    }

    fn recent(&self) -> Vec<CalculationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
