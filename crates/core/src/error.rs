#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
