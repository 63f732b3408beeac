use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record system not ready")]
    NotReady,

    #[error("record system unavailable: {0}")]
    Unavailable(String),

    #[error("malformed record data: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
