//! Quillboard core: the article draft model, the in-memory draft store, and
//! the validation rules.
//!
//! This crate has no async or I/O dependencies. The save/publish state
//! machine that drives a [`store::DraftStore`] lives in `quillboard-editor`.

pub mod analytics;
pub mod draft;
pub mod error;
pub mod slug;
pub mod store;
pub mod types;
pub mod validation;

pub use analytics::TextStats;
pub use draft::{
    ArticleStatus, Draft, DraftPatch, MediaItem, MediaKind, MediaRefs, PublishSettings, SeoMeta,
    SocialMeta, TwitterCard, Visibility,
};
pub use error::CoreError;
pub use store::DraftStore;
pub use validation::{is_publishable, validate, Severity, ValidationIssue, ValidationReport};
