use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// A single coded measurement from the record, e.g. a serum creatinine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub code: String,
    pub value: f64,
    /// Unit as recorded. `None` means the value is already in the unit the
    /// reader expects.
    #[serde(default)]
    pub unit: Option<String>,
    pub effective: Timestamp,
}

impl Observation {
    pub fn new(code: &str, value: f64, unit: Option<&str>, effective: Timestamp) -> Self {
        Self {
            code: code.to_string(),
            value,
            unit: unit.map(str::to_string),
            effective,
        }
    }

    /// Whole days between `effective` and `now`. Negative for future dates.
    pub fn age_days(&self, now: Timestamp) -> i64 {
        let elapsed: SignedDuration = now.duration_since(self.effective);
        elapsed.as_secs() / SECONDS_PER_DAY
    }

    /// True when the observation is strictly older than `threshold_days`.
    pub fn is_stale(&self, now: Timestamp, threshold_days: u32) -> bool {
        self.age_days(now) > i64::from(threshold_days)
    }
}
