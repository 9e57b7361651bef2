//! Quillboard editor event bus.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`EditorEvent`] — the envelope a draft session publishes when a save or
//!   publish settles.

pub mod bus;

pub use bus::{event_types, EditorEvent, EventBus};
