//! Quillboard editor: the article draft session.
//!
//! [`DraftSession`] wraps a [`quillboard_core::DraftStore`] with a debounced
//! auto-save coordinator and a save-then-publish coordinator. Persistence is
//! delegated to an injected [`ArticleBackend`]; progress is observable through
//! [`SaveState`] (a `tokio::sync::watch` channel) and, optionally, an
//! [`quillboard_events::EventBus`].

pub mod backend;
pub mod config;
pub mod error;
pub mod save_state;
pub mod session;

pub use backend::ArticleBackend;
pub use config::SessionConfig;
pub use error::{BackendError, EditorError};
pub use save_state::{SaveOutcome, SavePhase, SaveState, SaveTrigger};
pub use session::DraftSession;
