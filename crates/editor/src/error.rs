/// Failure reported by an [`ArticleBackend`](crate::backend::ArticleBackend).
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The backend refused the draft (HTTP 4xx/5xx, constraint violation, ...).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or could not write.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors returned by [`DraftSession::publish`](crate::session::DraftSession::publish).
///
/// The save path never returns an error; it reports through
/// [`SaveOutcome`](crate::save_state::SaveOutcome) and the observable
/// [`SaveState`](crate::save_state::SaveState).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("Save before publish failed: {0}")]
    SaveFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("A publish is already in progress")]
    PublishInFlight,

    #[error("Draft session is closed")]
    Closed,
}
