//! Draft validation rules and the publishability check.
//!
//! [`validate`] runs the editorial rules in a fixed order and never mutates
//! its input. [`metadata_issues`] is a separate format check on the SEO and
//! social blocks, driven by the `validator` derive on those structs; it is
//! advisory only and does not affect [`is_publishable`].

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::draft::{ArticleStatus, Draft};

/// Titles longer than this get truncated in search results.
pub const MAX_SEO_TITLE_CHARS: usize = 60;

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding against one draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `"title"` or `"seo.description"`.
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Run the editorial rules, in declaration order:
///
/// 1. empty title: error
/// 2. empty content: error
/// 3. title over [`MAX_SEO_TITLE_CHARS`] characters: warning
/// 4. published without an SEO description: warning
pub fn validate(draft: &Draft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if draft.title.trim().is_empty() {
        issues.push(ValidationIssue::error("title", "Title is required"));
    }

    if draft.content.trim().is_empty() {
        issues.push(ValidationIssue::error("content", "Content is required"));
    }

    if draft.title.chars().count() > MAX_SEO_TITLE_CHARS {
        issues.push(ValidationIssue::warning(
            "title",
            format!(
                "Title is longer than {MAX_SEO_TITLE_CHARS} characters and may be truncated in search results"
            ),
        ));
    }

    if draft.status() == ArticleStatus::Published && draft.seo.description.trim().is_empty() {
        issues.push(ValidationIssue::warning(
            "seo.description",
            "Published articles should have an SEO description",
        ));
    }

    issues
}

/// A draft is publishable when it has no error-severity issues.
pub fn is_publishable(draft: &Draft) -> bool {
    !validate(draft).iter().any(ValidationIssue::is_error)
}

/// Format checks on the SEO and social blocks (lengths, URLs), as warnings.
///
/// Issues are sorted by field path so the output is stable.
pub fn metadata_issues(draft: &Draft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if let Err(errors) = draft.seo.validate() {
        collect_warnings("seo", &errors, &mut issues);
    }
    if let Err(errors) = draft.social.validate() {
        collect_warnings("social", &errors, &mut issues);
    }
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

fn collect_warnings(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ValidationIssue>) {
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", err.code));
            out.push(ValidationIssue::warning(
                &format!("{prefix}.{}", to_camel_case(&field)),
                message,
            ));
        }
    }
}

/// `canonical_url` -> `canonicalUrl`, matching the JSON field names.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Issues split by severity, for hosts that render a summary.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub publishable: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Editorial rules plus metadata format warnings.
    pub fn for_draft(draft: &Draft) -> Self {
        let (errors, mut warnings): (Vec<_>, Vec<_>) =
            validate(draft).into_iter().partition(ValidationIssue::is_error);
        warnings.extend(metadata_issues(draft));
        Self {
            publishable: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> Draft {
        let mut draft = Draft::new("A reasonable title");
        draft.content = "Some body text.".into();
        draft
    }

    #[test]
    fn test_valid_draft_has_no_issues() {
        assert!(validate(&valid_draft()).is_empty());
        assert!(is_publishable(&valid_draft()));
    }

    #[test]
    fn test_empty_title_and_body_yield_two_errors() {
        let issues = validate(&Draft::default());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(ValidationIssue::is_error));
        assert_eq!(issues[0].field, "title");
        assert_eq!(issues[0].message, "Title is required");
        assert_eq!(issues[1].field, "content");
        assert_eq!(issues[1].message, "Content is required");
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let mut draft = valid_draft();
        draft.title = "   ".into();
        let issues = validate(&draft);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Title is required");
    }

    #[test]
    fn test_long_title_is_warning_only() {
        let mut draft = valid_draft();
        draft.title = "x".repeat(61);
        let issues = validate(&draft);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].field, "title");
        assert!(is_publishable(&draft));
    }

    #[test]
    fn test_title_of_exactly_sixty_chars_is_fine() {
        let mut draft = valid_draft();
        draft.title = "x".repeat(60);
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_published_without_seo_description_warns() {
        let mut draft = valid_draft();
        draft.publishing.status = ArticleStatus::Published;
        let issues = validate(&draft);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "seo.description");
        assert_eq!(issues[0].severity, Severity::Warning);

        draft.seo.description = "About this article".into();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_issue_order_follows_rule_order() {
        let mut draft = Draft::default();
        draft.title = " ".repeat(70);
        draft.publishing.status = ArticleStatus::Published;
        let fields: Vec<_> = validate(&draft)
            .into_iter()
            .map(|i| (i.field, i.severity))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("title".to_string(), Severity::Error),
                ("content".to_string(), Severity::Error),
                ("title".to_string(), Severity::Warning),
                ("seo.description".to_string(), Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_validate_is_deterministic_and_pure() {
        let draft = Draft::default();
        let copy = draft.clone();
        assert_eq!(validate(&draft), validate(&draft));
        assert_eq!(draft, copy);
    }

    #[test]
    fn test_publishable_matches_error_count() {
        let mut draft = valid_draft();
        draft.content.clear();
        let errors = validate(&draft).iter().filter(|i| i.is_error()).count();
        assert_eq!(is_publishable(&draft), errors == 0);
        assert!(!is_publishable(&draft));
    }

    #[test]
    fn test_metadata_issues_flag_bad_urls_and_lengths() {
        let mut draft = valid_draft();
        draft.seo.canonical_url = Some("not a url".into());
        draft.seo.description = "d".repeat(161);
        draft.social.og_image = Some("https://cdn.example.com/cover.png".into());

        let issues = metadata_issues(&draft);
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["seo.canonicalUrl", "seo.description"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(is_publishable(&draft));
    }

    #[test]
    fn test_report_splits_by_severity() {
        let mut draft = Draft::default();
        draft.social.og_image = Some("nope".into());
        let report = ValidationReport::for_draft(&draft);
        assert!(!report.publishable);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "social.ogImage");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("canonical_url"), "canonicalUrl");
        assert_eq!(to_camel_case("og_image"), "ogImage");
        assert_eq!(to_camel_case("description"), "description");
    }
}
