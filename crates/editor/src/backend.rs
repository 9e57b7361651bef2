//! The persistence seam supplied by the hosting application.

use async_trait::async_trait;
use quillboard_core::Draft;

use crate::error::BackendError;

/// Host-side persistence for a draft session.
///
/// Both calls are black boxes to the session: no retry, no backoff, no
/// idempotency key. A returned error is recorded as the session's
/// `last_error` and otherwise left to the user to act on.
#[async_trait]
pub trait ArticleBackend: Send + Sync {
    /// Persist a draft snapshot.
    async fn save(&self, draft: &Draft) -> Result<(), BackendError>;

    /// Perform publish-side effects for a snapshot already stamped as
    /// published.
    async fn publish(&self, draft: &Draft) -> Result<(), BackendError>;
}
