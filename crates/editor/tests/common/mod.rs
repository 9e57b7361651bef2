//! Shared fixtures for draft session tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quillboard_core::Draft;
use quillboard_editor::{ArticleBackend, BackendError, DraftSession, SessionConfig};
use tokio::sync::Semaphore;
use tokio::time::Instant;

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(3000);

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct Call {
    pub draft: Draft,
    pub at: Instant,
}

/// In-memory backend that records every call and can be told to fail or to
/// hold calls until released.
#[derive(Default)]
pub struct RecordingBackend {
    saves: Mutex<Vec<Call>>,
    publishes: Mutex<Vec<Call>>,
    fail_saves: AtomicBool,
    fail_publishes: AtomicBool,
    save_gate: Option<Semaphore>,
    publish_gate: Option<Semaphore>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Saves block until [`release_saves`](Self::release_saves) is called.
    pub fn with_gated_saves() -> Arc<Self> {
        Arc::new(Self {
            save_gate: Some(Semaphore::new(0)),
            ..Default::default()
        })
    }

    /// Publishes block until [`release_publishes`](Self::release_publishes).
    pub fn with_gated_publishes() -> Arc<Self> {
        Arc::new(Self {
            publish_gate: Some(Semaphore::new(0)),
            ..Default::default()
        })
    }

    pub fn release_saves(&self, n: usize) {
        self.save_gate.as_ref().expect("saves are gated").add_permits(n);
    }

    pub fn release_publishes(&self, n: usize) {
        self.publish_gate
            .as_ref()
            .expect("publishes are gated")
            .add_permits(n);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<Call> {
        self.saves.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn publishes(&self) -> Vec<Call> {
        self.publishes.lock().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.lock().unwrap().len()
    }
}

#[async_trait]
impl ArticleBackend for RecordingBackend {
    async fn save(&self, draft: &Draft) -> Result<(), BackendError> {
        self.saves.lock().unwrap().push(Call {
            draft: draft.clone(),
            at: Instant::now(),
        });
        if let Some(gate) = &self.save_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("save rejected".into()));
        }
        Ok(())
    }

    async fn publish(&self, draft: &Draft) -> Result<(), BackendError> {
        self.publishes.lock().unwrap().push(Call {
            draft: draft.clone(),
            at: Instant::now(),
        });
        if let Some(gate) = &self.publish_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("publish rejected".into()));
        }
        Ok(())
    }
}

pub fn session_with(backend: &Arc<RecordingBackend>, initial: Draft) -> DraftSession {
    DraftSession::new(initial, backend.clone(), SessionConfig::default())
}

/// Let spawned tasks run without moving the paused clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock, then let woken tasks run.
pub async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}
