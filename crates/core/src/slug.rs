//! URL slug generation from article titles.

/// Slugs longer than this are cut at the last hyphen before the limit.
pub const MAX_SLUG_LENGTH: usize = 80;

/// Lowercase ASCII alphanumerics joined by single hyphens.
///
/// Every run of other characters becomes one separator; leading and trailing
/// separators are dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        if let Some(cut) = slug.rfind('-') {
            slug.truncate(cut);
        }
    }
    slug
}
