use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::RecordError;
use crate::observation::Observation;
use crate::source::{BoxFuture, RecordSource};
use crate::subject::Subject;

/// A record held entirely in memory.
///
/// When several observations share a code, the most recent one wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecords {
    observations: HashMap<String, Observation>,
    conditions: HashSet<String>,
    latency: Option<Duration>,
    failure: Option<String>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.insert(observation);
        self
    }

    pub fn with_condition(mut self, code: &str) -> Self {
        self.conditions.insert(code.to_string());
        self
    }

    /// Delay every lookup, to simulate a slow record system.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every lookup with [`RecordError::Unavailable`].
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    fn insert(&mut self, observation: Observation) {
        match self.observations.get(&observation.code) {
            Some(existing) if existing.effective >= observation.effective => {}
            _ => {
                self.observations
                    .insert(observation.code.clone(), observation);
            }
        }
    }

    async fn wait(&self) -> Result<(), RecordError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(reason) => Err(RecordError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl RecordSource for InMemoryRecords {
    fn is_ready(&self) -> bool {
        true
    }

    fn observation<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Result<Option<Observation>, RecordError>> {
        Box::pin(async move {
            self.wait().await?;
            let found = self.observations.get(code).cloned();
            debug!(code, found = found.is_some(), "observation lookup");
            Ok(found)
        })
    }

    fn has_condition<'a>(&'a self, codes: &'a [String]) -> BoxFuture<'a, Result<bool, RecordError>> {
        Box::pin(async move {
            self.wait().await?;
            Ok(codes.iter().any(|code| self.conditions.contains(code)))
        })
    }
}

/// JSON fixture describing one subject and their record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordBundle {
    pub subject: Subject,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl RecordBundle {
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let bundle: RecordBundle = serde_json::from_str(json)?;
        if bundle.subject.id.is_empty() {
            return Err(RecordError::Malformed("subject id is empty".to_string()));
        }
        Ok(bundle)
    }

    pub fn into_parts(self) -> (Subject, InMemoryRecords) {
        let mut records = InMemoryRecords::new();
        for observation in self.observations {
            records.insert(observation);
        }
        for code in &self.conditions {
            records.conditions.insert(code.clone());
        }
        (self.subject, records)
    }
}
