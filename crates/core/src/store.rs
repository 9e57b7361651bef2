//! In-memory draft store: the single owner of the draft being edited.
//!
//! The store tracks a dirty flag and a monotonically increasing version.
//! Every [`DraftStore::update`] bumps the version, so a save that captured
//! version `n` can later tell whether the draft changed while it was in
//! flight.

use chrono::{Duration, Utc};

use crate::draft::{ArticleStatus, Draft, DraftPatch};
use crate::types::{DraftVersion, Timestamp};

#[derive(Debug, Clone)]
pub struct DraftStore {
    draft: Draft,
    dirty: bool,
    version: DraftVersion,
}

impl DraftStore {
    /// Wrap an initial draft. Analytics are recomputed; the store starts clean.
    pub fn new(mut initial: Draft) -> Self {
        initial.refresh_analytics();
        Self {
            draft: initial,
            dirty: false,
            version: 0,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn snapshot(&self) -> Draft {
        self.draft.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> DraftVersion {
        self.version
    }

    /// Merge a partial update, stamp `last_modified`, and mark dirty.
    ///
    /// Word and character counts are recomputed only when the patch touches
    /// the body.
    pub fn update(&mut self, patch: DraftPatch) -> &Draft {
        let touches_content = patch.touches_content();
        patch.apply_to(&mut self.draft);
        if touches_content {
            self.draft.refresh_analytics();
        }
        self.touch();
        &self.draft
    }

    /// Apply an arbitrary in-place edit (tag helpers, nested field tweaks).
    /// Analytics are always recomputed afterwards.
    pub fn edit(&mut self, f: impl FnOnce(&mut Draft)) -> &Draft {
        f(&mut self.draft);
        self.draft.refresh_analytics();
        self.touch();
        &self.draft
    }

    /// Swap in a whole new value, e.g. the published snapshot returned by a
    /// successful publish. The dirty flag is left as is.
    pub fn replace(&mut self, mut draft: Draft) {
        draft.refresh_analytics();
        self.draft = draft;
        self.version += 1;
    }

    /// Stamp the current draft as published without touching anything else.
    ///
    /// Used when the draft was edited after the published snapshot was taken:
    /// the newer edits stay, and so does the dirty flag.
    pub fn mark_published(&mut self, publish_date: Timestamp) -> &Draft {
        self.draft.publishing.status = ArticleStatus::Published;
        self.draft.publishing.publish_date = Some(publish_date);
        self.version += 1;
        &self.draft
    }

    /// Clear the dirty flag if `version` is still current.
    ///
    /// Returns `false` (and stays dirty) when the draft changed after the
    /// save captured its snapshot.
    pub fn mark_saved(&mut self, version: DraftVersion) -> bool {
        if version == self.version {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    fn touch(&mut self) {
        self.draft.last_modified = next_stamp(self.draft.last_modified);
        self.dirty = true;
        self.version += 1;
    }
}

/// `now`, or just past `previous` when the clock has not moved (or went back).
fn next_stamp(previous: Timestamp) -> Timestamp {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
