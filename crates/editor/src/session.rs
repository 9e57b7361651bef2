//! Draft session: the save and publish coordinators around a [`DraftStore`].
//!
//! A [`DraftSession`] is a cheap, cloneable handle. Every presentation
//! variant (simple editor, advanced editor, metadata panels) holds a clone
//! and drives the same state machine:
//!
//! ```text
//!            edit                     timer expires
//!   Idle ──────────► PendingAutoSave ───────────────► AutoSaving ──┐
//!   Error ─────────►   ▲    │ edit: restart timer                  │
//!                      └────┘                                      │
//!   Idle/Error/PendingAutoSave ── save() ──► Saving ───────────────┤
//!                                                                  │
//!                          backend Ok ──► Idle   backend Err ──► Error
//! ```
//!
//! All state sits behind one mutex that is never held across an `.await`, so
//! each transition runs to completion. The debounce timer is a spawned task
//! owned by the session through a [`CancellationToken`]; background tasks
//! only keep a [`Weak`] reference, so dropping the last handle (or calling
//! [`DraftSession::close`]) guarantees no later backend call is started and
//! late results are ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use quillboard_core::types::{DraftVersion, Timestamp};
use quillboard_core::{validate, ArticleStatus, Draft, DraftPatch, DraftStore, ValidationIssue};
use quillboard_events::{event_types, EditorEvent, EventBus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::backend::ArticleBackend;
use crate::config::SessionConfig;
use crate::error::{BackendError, EditorError};
use crate::save_state::{SaveOutcome, SavePhase, SaveState, SaveTrigger};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// The scheduled auto-save. Superseded timers are cancelled and, should one
/// still wake up, rejected by the generation check.
struct PendingTimer {
    generation: u64,
    cancel: CancellationToken,
}

struct Inner {
    store: DraftStore,
    phase: SavePhase,
    last_saved_at: Option<Timestamp>,
    last_error: Option<String>,
    timer: Option<PendingTimer>,
    timer_generation: u64,
    publishing: bool,
    closed: bool,
}

impl Inner {
    fn save_state(&self) -> SaveState {
        SaveState::new(
            self.phase,
            self.last_saved_at,
            self.store.is_dirty(),
            self.last_error.clone(),
        )
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    backend: Arc<dyn ArticleBackend>,
    config: SessionConfig,
    events: Option<Arc<EventBus>>,
    state_tx: watch::Sender<SaveState>,
    /// Root token; every timer token is a child of it.
    cancel: CancellationToken,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_state(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.save_state());
    }

    fn emit(&self, event: EditorEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// Entry rule of the coordinator: a dirty draft with no save in flight
    /// goes (back) to `PendingAutoSave` with a fresh timer.
    fn after_edit(self: &Arc<Self>, inner: &mut Inner) {
        if inner.closed || !self.config.autosave_enabled || inner.phase.is_in_flight() {
            return;
        }
        if inner.store.is_dirty() {
            self.schedule_autosave(inner);
        }
    }

    fn schedule_autosave(self: &Arc<Self>, inner: &mut Inner) {
        inner.cancel_timer();
        inner.timer_generation += 1;
        let generation = inner.timer_generation;
        let token = self.cancel.child_token();
        inner.timer = Some(PendingTimer {
            generation,
            cancel: token.clone(),
        });
        inner.phase = SavePhase::PendingAutoSave;

        let delay = self.config.autosave_delay;
        // Deadline fixed at edit time, not when the task is first polled.
        let deadline = tokio::time::Instant::now() + delay;
        let weak = Arc::downgrade(self);
        tracing::debug!(
            generation,
            delay_ms = delay.as_millis() as u64,
            "Auto-save scheduled"
        );

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    fire_autosave(weak, generation).await;
                }
            }
        });
    }

    /// Apply a settled backend result. Returns the outcome for the caller.
    fn finish_save(
        self: &Arc<Self>,
        trigger: SaveTrigger,
        version: DraftVersion,
        result: Result<(), BackendError>,
    ) -> SaveOutcome {
        let mut inner = self.lock();

        if inner.closed {
            tracing::debug!(version, "Save settled after session close, result ignored");
            return match result {
                Ok(()) => SaveOutcome::Saved { at: Utc::now() },
                Err(e) => SaveOutcome::Failed(e.to_string()),
            };
        }

        let article_id = inner.store.draft().id;
        match result {
            Ok(()) => {
                let at = Utc::now();
                inner.phase = SavePhase::Idle;
                inner.last_saved_at = Some(at);
                inner.last_error = None;
                let clean = inner.store.mark_saved(version);
                tracing::info!(
                    %article_id,
                    version,
                    trigger = trigger.as_str(),
                    clean,
                    "Draft saved"
                );

                let event_type = match trigger {
                    SaveTrigger::Manual => event_types::SAVED,
                    SaveTrigger::Auto => event_types::AUTO_SAVED,
                };
                self.emit(EditorEvent::new(event_type, article_id).with_version(version));

                // Edits that landed during the flight are still unsaved.
                self.after_edit(&mut inner);
                self.publish_state(&inner);
                SaveOutcome::Saved { at }
            }
            Err(e) => {
                let message = e.to_string();
                inner.phase = SavePhase::Error;
                inner.last_error = Some(message.clone());
                tracing::warn!(
                    %article_id,
                    version,
                    trigger = trigger.as_str(),
                    error = %message,
                    "Draft save failed"
                );
                self.emit(
                    EditorEvent::new(event_types::SAVE_FAILED, article_id)
                        .with_version(version)
                        .with_payload(serde_json::json!({
                            "trigger": trigger.as_str(),
                            "error": message,
                        })),
                );
                self.publish_state(&inner);
                SaveOutcome::Failed(message)
            }
        }
    }
}

/// Timer expiry: take the snapshot now (not at schedule time) and save it.
async fn fire_autosave(weak: Weak<Shared>, generation: u64) {
    let (snapshot, version) = {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        match &inner.timer {
            Some(timer) if timer.generation == generation => {}
            _ => return,
        }
        inner.timer = None;
        if inner.closed || inner.phase != SavePhase::PendingAutoSave {
            return;
        }
        inner.phase = SavePhase::AutoSaving;
        shared.publish_state(&inner);
        (inner.store.snapshot(), inner.store.version())
    };

    run_save(weak, SaveTrigger::Auto, snapshot, version).await;
}

/// One backend save. Holds no strong reference while the backend call is in
/// flight, so a session dropped meanwhile simply ignores the result.
async fn run_save(
    weak: Weak<Shared>,
    trigger: SaveTrigger,
    snapshot: Draft,
    version: DraftVersion,
) -> Option<SaveOutcome> {
    let backend = weak.upgrade().map(|shared| Arc::clone(&shared.backend))?;
    let result = backend.save(&snapshot).await;
    drop(backend);

    match weak.upgrade() {
        Some(shared) => Some(shared.finish_save(trigger, version, result)),
        None => {
            tracing::debug!(version, "Save settled after session drop, result ignored");
            None
        }
    }
}

/// Clears the `publishing` flag however `publish` exits.
struct PublishGuard<'a>(&'a Shared);

impl Drop for PublishGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().publishing = false;
    }
}

// ---------------------------------------------------------------------------
// DraftSession
// ---------------------------------------------------------------------------

/// Handle to one article editing session.
///
/// Must be created and used inside a Tokio runtime: edits spawn the
/// debounce timer.
#[derive(Clone)]
pub struct DraftSession {
    shared: Arc<Shared>,
}

impl DraftSession {
    pub fn new(initial: Draft, backend: Arc<dyn ArticleBackend>, config: SessionConfig) -> Self {
        Self::build(initial, backend, config, None)
    }

    /// Like [`new`](Self::new), also publishing [`EditorEvent`]s on `bus`.
    pub fn with_event_bus(
        initial: Draft,
        backend: Arc<dyn ArticleBackend>,
        config: SessionConfig,
        bus: Arc<EventBus>,
    ) -> Self {
        Self::build(initial, backend, config, Some(bus))
    }

    fn build(
        initial: Draft,
        backend: Arc<dyn ArticleBackend>,
        config: SessionConfig,
        events: Option<Arc<EventBus>>,
    ) -> Self {
        let inner = Inner {
            store: DraftStore::new(initial),
            phase: SavePhase::Idle,
            last_saved_at: None,
            last_error: None,
            timer: None,
            timer_generation: 0,
            publishing: false,
            closed: false,
        };
        let (state_tx, _) = watch::channel(inner.save_state());
        tracing::debug!(article_id = %inner.store.draft().id, "Draft session opened");

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                backend,
                config,
                events,
                state_tx,
                cancel: CancellationToken::new(),
            }),
        }
    }

    // -- reads --------------------------------------------------------------

    pub fn draft(&self) -> Draft {
        self.shared.lock().store.snapshot()
    }

    pub fn version(&self) -> DraftVersion {
        self.shared.lock().store.version()
    }

    pub fn save_state(&self) -> SaveState {
        self.shared.lock().save_state()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.shared.lock().store.is_dirty()
    }

    /// Observe save-state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.shared.state_tx.subscribe()
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate(self.shared.lock().store.draft())
    }

    pub fn is_publishable(&self) -> bool {
        quillboard_core::is_publishable(self.shared.lock().store.draft())
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    // -- edits --------------------------------------------------------------

    /// Merge a partial update and (re)start the auto-save debounce.
    ///
    /// While a save is in flight the draft is updated and marked dirty but
    /// no timer starts; the coordinator reschedules once the flight settles.
    pub fn update(&self, patch: DraftPatch) -> Draft {
        let mut inner = self.shared.lock();
        let draft = inner.store.update(patch).clone();
        self.shared.after_edit(&mut inner);
        self.shared.publish_state(&inner);
        draft
    }

    /// In-place edit for changes a patch cannot express conveniently.
    pub fn edit(&self, f: impl FnOnce(&mut Draft)) -> Draft {
        let mut inner = self.shared.lock();
        let draft = inner.store.edit(f).clone();
        self.shared.after_edit(&mut inner);
        self.shared.publish_state(&inner);
        draft
    }

    pub fn add_tag(&self, tag: &str) -> Draft {
        self.edit(|d| {
            d.add_tag(tag);
        })
    }

    pub fn remove_tag(&self, tag: &str) -> Draft {
        self.edit(|d| {
            d.remove_tag(tag);
        })
    }

    // -- save ---------------------------------------------------------------

    /// User-triggered save of the current draft.
    ///
    /// Cancels a pending auto-save. If a save is already in flight this is a
    /// no-op returning [`SaveOutcome::Skipped`]. Failures are returned as
    /// [`SaveOutcome::Failed`] and recorded in [`SaveState::last_error`].
    pub async fn save(&self) -> SaveOutcome {
        let (snapshot, version) = {
            let mut inner = self.shared.lock();
            if inner.closed {
                return SaveOutcome::Skipped;
            }
            if inner.phase.is_in_flight() {
                tracing::debug!(phase = inner.phase.as_str(), "Save already in flight, skipping");
                return SaveOutcome::Skipped;
            }
            inner.cancel_timer();
            inner.phase = SavePhase::Saving;
            self.shared.publish_state(&inner);
            (inner.store.snapshot(), inner.store.version())
        };

        // Spawned so that dropping this future cannot strand the session in
        // `Saving`.
        let weak = Arc::downgrade(&self.shared);
        match tokio::spawn(run_save(weak, SaveTrigger::Manual, snapshot, version)).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => SaveOutcome::Skipped,
            Err(join_err) => {
                let message = format!("save task failed: {join_err}");
                self.shared
                    .finish_save(SaveTrigger::Manual, version, Err(BackendError::Io(message)))
            }
        }
    }

    // -- publish ------------------------------------------------------------

    /// Save if needed, then publish.
    ///
    /// Waits for any in-flight save to settle. If the draft is dirty it is
    /// saved first; a failed save aborts the publish with
    /// [`EditorError::SaveFailed`], leaving the status unchanged and the
    /// backend's `publish` uncalled. On success the store holds the
    /// published snapshot, which is also returned. Edits made while the
    /// backend call runs are kept; only the status and publish date are
    /// stamped onto them.
    pub async fn publish(&self) -> Result<Draft, EditorError> {
        {
            let mut inner = self.shared.lock();
            if inner.closed {
                return Err(EditorError::Closed);
            }
            if inner.publishing {
                return Err(EditorError::PublishInFlight);
            }
            inner.publishing = true;
        }
        let _guard = PublishGuard(&self.shared);

        let mut state_rx = self.shared.state_tx.subscribe();
        loop {
            state_rx
                .wait_for(|state| !state.is_in_flight())
                .await
                .map_err(|_| EditorError::Closed)?;

            if !self.has_unsaved_changes() {
                break;
            }
            match self.save().await {
                SaveOutcome::Saved { .. } => break,
                SaveOutcome::Failed(message) => {
                    tracing::warn!(error = %message, "Publish aborted, save failed");
                    return Err(EditorError::SaveFailed(message));
                }
                // An auto-save won the race, or the session closed.
                SaveOutcome::Skipped => {
                    if self.is_closed() {
                        return Err(EditorError::Closed);
                    }
                }
            }
        }

        let (published, snapshot_version) = {
            let inner = self.shared.lock();
            let mut snapshot = inner.store.snapshot();
            snapshot.publishing.status = ArticleStatus::Published;
            snapshot.publishing.publish_date = Some(Utc::now());
            (snapshot, inner.store.version())
        };
        let article_id = published.id;

        let result = self.shared.backend.publish(&published).await;

        let mut inner = self.shared.lock();
        let outcome = match result {
            Ok(()) => {
                if !inner.closed {
                    if inner.store.version() == snapshot_version {
                        inner.store.replace(published.clone());
                    } else if let Some(date) = published.publishing.publish_date {
                        // Edited while the publish ran: keep the edits, and
                        // the pending auto-save picks them up.
                        inner.store.mark_published(date);
                        tracing::debug!(%article_id, "Draft edited during publish, edits kept");
                    }
                    inner.last_error = None;
                    self.shared.publish_state(&inner);
                }
                tracing::info!(%article_id, "Draft published");
                self.shared.emit(
                    EditorEvent::new(event_types::PUBLISHED, article_id)
                        .with_version(inner.store.version())
                        .with_payload(serde_json::json!({
                            "slug": published.effective_slug(),
                            "publishDate": published.publishing.publish_date,
                        })),
                );
                Ok(published)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(%article_id, error = %message, "Draft publish failed");
                if !inner.closed {
                    inner.last_error = Some(message.clone());
                    self.shared.publish_state(&inner);
                }
                self.shared.emit(
                    EditorEvent::new(event_types::PUBLISH_FAILED, article_id)
                        .with_payload(serde_json::json!({ "error": message })),
                );
                Err(EditorError::PublishFailed(message))
            }
        };
        drop(inner);
        outcome
    }

    // -- lifecycle ----------------------------------------------------------

    /// End the session: cancel the pending auto-save and ignore any result
    /// that settles afterwards. Idempotent.
    pub fn close(&self) {
        let mut inner = self.shared.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        inner.cancel_timer();
        if inner.phase == SavePhase::PendingAutoSave {
            inner.phase = SavePhase::Idle;
        }
        self.shared.cancel.cancel();
        self.shared.publish_state(&inner);
        tracing::debug!(
            article_id = %inner.store.draft().id,
            dirty = inner.store.is_dirty(),
            "Draft session closed"
        );
    }
}
