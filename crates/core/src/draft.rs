//! The article draft model and its partial-update patch.
//!
//! A [`Draft`] is the in-memory article being edited. It is serialized as
//! camelCase JSON so that the host application can hand it to its own
//! persistence layer unchanged. All mutation goes through
//! [`DraftPatch`] (shallow, field-level merge) or the tag helpers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::analytics::TextStats;
use crate::error::CoreError;
use crate::slug::slugify;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Publication status of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Review,
    Scheduled,
    Published,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Who can read the article once published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Password,
}

/// Twitter card layout used when the article is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwitterCard {
    #[default]
    Summary,
    SummaryLargeImage,
}

/// Kind of an attached media reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Audio,
    Document,
}

// ---------------------------------------------------------------------------
// Metadata blocks
// ---------------------------------------------------------------------------

/// A reference to an uploaded media asset. The draft never owns the bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItem {
    pub url: String,
    pub kind: MediaKind,
    pub alt_text: String,
    pub caption: String,
}

/// Featured image plus inline gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaRefs {
    pub featured_image: Option<MediaItem>,
    pub gallery: Vec<MediaItem>,
}

/// Search-engine metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoMeta {
    #[validate(length(max = 60, message = "Meta title should be at most 60 characters"))]
    pub meta_title: String,
    #[validate(length(max = 160, message = "SEO description should be at most 160 characters"))]
    pub description: String,
    pub keywords: Vec<String>,
    #[validate(url(message = "Canonical URL must be a valid URL"))]
    pub canonical_url: Option<String>,
}

/// Open Graph / Twitter sharing metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialMeta {
    #[validate(length(max = 95, message = "Open Graph title should be at most 95 characters"))]
    pub og_title: String,
    #[validate(length(max = 200, message = "Open Graph description should be at most 200 characters"))]
    pub og_description: String,
    #[validate(url(message = "Open Graph image must be a valid URL"))]
    pub og_image: Option<String>,
    pub twitter_card: TwitterCard,
}

/// Publishing settings panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishSettings {
    pub status: ArticleStatus,
    pub visibility: Visibility,
    pub publish_date: Option<Timestamp>,
    pub scheduled_at: Option<Timestamp>,
    pub allow_comments: bool,
    pub featured: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            status: ArticleStatus::Draft,
            visibility: Visibility::Public,
            publish_date: None,
            scheduled_at: None,
            allow_comments: true,
            featured: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Snapshot of the article being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub id: Uuid,
    pub title: String,
    /// URL slug. Empty means "derive from the title", see [`Draft::effective_slug`].
    pub slug: String,
    pub excerpt: String,
    /// Body text (markdown).
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub media: MediaRefs,
    pub seo: SeoMeta,
    pub social: SocialMeta,
    pub publishing: PublishSettings,
    /// Derived from `content`; recomputed by the store, never set by callers.
    pub analytics: TextStats,
    pub last_modified: Timestamp,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            title: String::new(),
            slug: String::new(),
            excerpt: String::new(),
            content: String::new(),
            category: None,
            tags: Vec::new(),
            media: MediaRefs::default(),
            seo: SeoMeta::default(),
            social: SocialMeta::default(),
            publishing: PublishSettings::default(),
            analytics: TextStats::default(),
            last_modified: Utc::now(),
        }
    }
}

impl Draft {
    /// A fresh draft with the given title and default settings.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Parse a draft from its JSON representation, recomputing analytics.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut draft: Draft = serde_json::from_str(json)?;
        draft.refresh_analytics();
        Ok(draft)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn status(&self) -> ArticleStatus {
        self.publishing.status
    }

    /// The explicit slug if set, otherwise one derived from the title.
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            self.slug.clone()
        }
    }

    pub fn refresh_analytics(&mut self) {
        self.analytics = TextStats::from_text(&self.content);
    }

    /// Add a tag. Whitespace is trimmed; empty and case-insensitive
    /// duplicates are ignored. Returns `true` if the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag (case-insensitive). Returns `true` if one was removed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| !t.eq_ignore_ascii_case(tag.trim()));
        self.tags.len() != before
    }
}

// ---------------------------------------------------------------------------
// DraftPatch
// ---------------------------------------------------------------------------

/// A partial update. `None` fields are left untouched; `Some` fields replace
/// the corresponding draft field wholesale (shallow merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the category.
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub media: Option<MediaRefs>,
    pub seo: Option<SeoMeta>,
    pub social: Option<SocialMeta>,
    pub publishing: Option<PublishSettings>,
}

impl DraftPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn touches_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `draft`. Does not touch analytics or `last_modified`;
    /// the store owns those.
    pub(crate) fn apply_to(self, draft: &mut Draft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(slug) = self.slug {
            draft.slug = slug;
        }
        if let Some(excerpt) = self.excerpt {
            draft.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(media) = self.media {
            draft.media = media;
        }
        if let Some(seo) = self.seo {
            draft.seo = seo;
        }
        if let Some(social) = self.social {
            draft.social = social;
        }
        if let Some(publishing) = self.publishing {
            draft.publishing = publishing;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_settings() {
        let draft = Draft::default();
        assert_eq!(draft.status(), ArticleStatus::Draft);
        assert_eq!(draft.publishing.visibility, Visibility::Public);
        assert!(draft.publishing.allow_comments);
        assert!(draft.publishing.publish_date.is_none());
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_effective_slug_prefers_explicit() {
        let mut draft = Draft::new("Hello World");
        assert_eq!(draft.effective_slug(), "hello-world");
        draft.slug = "custom-slug".into();
        assert_eq!(draft.effective_slug(), "custom-slug");
    }

    #[test]
    fn test_add_tag_dedupes_case_insensitively() {
        let mut draft = Draft::default();
        assert!(draft.add_tag("Rust"));
        assert!(!draft.add_tag("  rust "));
        assert!(!draft.add_tag("   "));
        assert!(draft.add_tag("async"));
        assert_eq!(draft.tags, vec!["Rust", "async"]);
    }

    #[test]
    fn test_remove_tag() {
        let mut draft = Draft::default();
        draft.add_tag("Rust");
        assert!(draft.remove_tag("RUST"));
        assert!(!draft.remove_tag("RUST"));
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_patch_leaves_unset_fields_untouched() {
        let mut draft = Draft::new("Original");
        draft.content = "body".into();
        draft.category = Some("news".into());

        DraftPatch::title("Changed").apply_to(&mut draft);

        assert_eq!(draft.title, "Changed");
        assert_eq!(draft.content, "body");
        assert_eq!(draft.category.as_deref(), Some("news"));
    }

    #[test]
    fn test_patch_can_clear_category() {
        let mut draft = Draft::default();
        draft.category = Some("news".into());
        DraftPatch {
            category: Some(None),
            ..Default::default()
        }
        .apply_to(&mut draft);
        assert!(draft.category.is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(DraftPatch::default().is_empty());
        assert!(!DraftPatch::content("x").is_empty());
        assert!(DraftPatch::content("x").touches_content());
        assert!(!DraftPatch::title("x").touches_content());
    }

    #[test]
    fn test_json_uses_camel_case_and_recomputes_analytics() {
        let json = r#"{
            "title": "Hi",
            "content": "one two three",
            "publishing": { "status": "review", "allowComments": false },
            "analytics": { "wordCount": 99 }
        }"#;
        let draft = Draft::from_json(json).expect("valid draft json");
        assert_eq!(draft.title, "Hi");
        assert_eq!(draft.status(), ArticleStatus::Review);
        assert!(!draft.publishing.allow_comments);
        assert_eq!(draft.analytics.word_count, 3);

        let out = draft.to_json_pretty().expect("serializes");
        assert!(out.contains("\"lastModified\""));
        assert!(out.contains("\"allowComments\": false"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Draft::from_json("not json"),
            Err(CoreError::Serialization(_))
        ));
    }
}
