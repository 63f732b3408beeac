use thiserror::Error;

use medcalc_core::error::CoreError;
use medcalc_record::error::RecordError;
use medcalc_widgets::error::WidgetError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("widget error: {0}")]
    Widget(#[from] WidgetError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("invalid calculator '{calculator}': {reason}")]
    InvalidConfig { calculator: String, reason: String },

    #[error("settings error: {0}")]
    Settings(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by author-supplied code: custom renderers, initializers
/// and auto-population hooks. Never escapes the engine.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("record lookup failed: {0}")]
    Record(#[from] RecordError),

    #[error("widget error: {0}")]
    Widget(#[from] WidgetError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        HookError::Failed(message.into())
    }
}
