use kilnbook_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Search index out of sync with the store: {0}")]
    IndexCorruption(String),

    #[error("Unsupported export format version {0}")]
    UnsupportedFormat(u32),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
