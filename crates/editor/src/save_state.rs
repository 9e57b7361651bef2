//! Observable save state of a draft session.

use serde::Serialize;

use quillboard_core::types::Timestamp;

/// Where the save coordinator currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePhase {
    #[default]
    Idle,
    /// Debounce timer running; an auto-save fires when it expires.
    PendingAutoSave,
    /// User-triggered save in flight.
    Saving,
    /// Timer-triggered save in flight.
    AutoSaving,
    /// Last save failed; the draft is still dirty.
    Error,
}

impl SavePhase {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Saving | Self::AutoSaving)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingAutoSave => "pending_auto_save",
            Self::Saving => "saving",
            Self::AutoSaving => "auto_saving",
            Self::Error => "error",
        }
    }
}

/// What started a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTrigger {
    Manual,
    Auto,
}

impl SaveTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

/// Snapshot of the save coordinator, as published to observers.
///
/// `is_saving` and `is_auto_saving` are derived from `phase` and therefore
/// never both true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub phase: SavePhase,
    pub is_saving: bool,
    pub is_auto_saving: bool,
    pub last_saved_at: Option<Timestamp>,
    pub has_unsaved_changes: bool,
    pub last_error: Option<String>,
}

impl SaveState {
    pub(crate) fn new(
        phase: SavePhase,
        last_saved_at: Option<Timestamp>,
        has_unsaved_changes: bool,
        last_error: Option<String>,
    ) -> Self {
        Self {
            phase,
            is_saving: phase == SavePhase::Saving,
            is_auto_saving: phase == SavePhase::AutoSaving,
            last_saved_at,
            has_unsaved_changes,
            last_error,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The backend accepted the snapshot.
    Saved { at: Timestamp },
    /// Nothing was sent: a save was already in flight or the session is closed.
    Skipped,
    /// The backend rejected the snapshot; also recorded as `last_error`.
    Failed(String),
}
