use std::path::Path;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::EngineError;

/// Current settings version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EngineSettings {
    /// Schema version. Missing or 0 = pre-versioned settings.
    #[serde(default)]
    pub settings_version: u32,
    /// Observations older than this many days are marked stale.
    #[serde(default = "default_staleness_days")]
    pub staleness_days: u32,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Heading of every result region.
    #[serde(default = "default_result_title")]
    pub result_title: String,
    #[serde(default = "default_prefill_enabled")]
    pub prefill_enabled: bool,
}

fn default_staleness_days() -> u32 {
    90
}

fn default_history_limit() -> usize {
    50
}

fn default_result_title() -> String {
    "Results".to_string()
}

fn default_prefill_enabled() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            settings_version: CURRENT_VERSION,
            staleness_days: default_staleness_days(),
            history_limit: default_history_limit(),
            result_title: default_result_title(),
            prefill_enabled: default_prefill_enabled(),
        }
    }
}

impl EngineSettings {
    pub fn from_json(contents: &str) -> Result<Self, EngineError> {
        // Parse as raw JSON so migrations run before deserializing.
        let json: serde_json::Value = serde_json::from_str(contents)?;
        let on_disk_version = json
            .get("settings_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        let migrated = migrate(json, on_disk_version)?;
        Ok(serde_json::from_value(migrated)?)
    }

    /// Reads settings from `path`, or returns the defaults when it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Always write the current version, regardless of what was loaded.
        let mut stamped = self.clone();
        stamped.settings_version = CURRENT_VERSION;
        let json = serde_json::to_string_pretty(&stamped)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, path)?;

        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> Result<serde_json::Value, EngineError> {
    if from_version > CURRENT_VERSION {
        return Err(EngineError::Settings(format!(
            "settings_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    // v0 → v1: `stale_after_days` renamed to `staleness_days`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| EngineError::Settings("settings are not a JSON object".to_string()))?;
        if let Some(days) = obj.remove("stale_after_days") {
            obj.entry("staleness_days").or_insert(days);
        }
        obj.insert(
            "settings_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated settings v0 → v1 (renamed stale_after_days)");
    }

    Ok(json)
}
