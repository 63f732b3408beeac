use std::path::{Path, PathBuf};

use medcalc_engine::settings::EngineSettings;

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("medcalc"))
}

pub fn settings_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("settings.json"))
}

/// Settings from `explicit`, or from the user config directory. A missing
/// file yields the defaults.
pub fn load_settings(explicit: Option<&Path>) -> eyre::Result<EngineSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => settings_path()?,
    };
    let settings = EngineSettings::load(&path)
        .map_err(|e| eyre::eyre!("failed to load settings from {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), staleness_days = settings.staleness_days, "settings loaded");
    Ok(settings)
}
