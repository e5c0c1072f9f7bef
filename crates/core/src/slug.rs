//! Service slug generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").expect("valid regex"));

/// Derive a URL slug from a title: lowercase, whitespace runs become `-`,
/// anything outside `[a-z0-9_-]` is dropped.
pub fn slugify(title: &str) -> Result<String, CoreError> {
    let lower = title.trim().to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&lower, "-");
    let slug = DISALLOWED_RE.replace_all(&dashed, "").into_owned();
    if slug.is_empty() || slug.chars().all(|c| c == '-') {
        return Err(CoreError::Validation(format!(
            "Cannot derive a slug from '{title}'"
        )));
    }
    Ok(slug)
}

/// Check an explicitly supplied slug against the slug alphabet.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || DISALLOWED_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}
