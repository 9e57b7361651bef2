//! JSON-file persistence used by the CLI host.
//!
//! Saves go to `<dir>/<slug>.draft.json`, publishes to
//! `<dir>/<slug>.published.json`. Files are written to a temporary sibling
//! and renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quillboard_core::Draft;
use quillboard_editor::{ArticleBackend, BackendError};

pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn draft_path(&self, draft: &Draft) -> PathBuf {
        self.dir.join(format!("{}.draft.json", file_stem(draft)))
    }

    pub fn published_path(&self, draft: &Draft) -> PathBuf {
        self.dir.join(format!("{}.published.json", file_stem(draft)))
    }

    async fn write_json(&self, path: &Path, draft: &Draft) -> Result<(), BackendError> {
        let json = draft
            .to_json_pretty()
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        tracing::debug!(path = %path.display(), "Wrote draft file");
        Ok(())
    }
}

/// Slug, or the draft id when the title yields no slug.
fn file_stem(draft: &Draft) -> String {
    let slug = draft.effective_slug();
    if slug.is_empty() {
        draft.id.to_string()
    } else {
        slug
    }
}

#[async_trait]
impl ArticleBackend for FileBackend {
    async fn save(&self, draft: &Draft) -> Result<(), BackendError> {
        self.write_json(&self.draft_path(draft), draft).await
    }

    async fn publish(&self, draft: &Draft) -> Result<(), BackendError> {
        self.write_json(&self.published_path(draft), draft).await
    }
}
