use thiserror::Error;

use medcalc_engine::error::EngineError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown calculator: {0}")]
    UnknownCalculator(String),

    #[error("calculator '{0}' is already registered")]
    DuplicateId(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
