//! Slug helpers for post file names

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref URL_SAFE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Slug used when a title has no usable characters
pub const FALLBACK_SLUG: &str = "untitled";

/// Turn a title into a file-name slug.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen and trims hyphens from both ends.
///
/// ```
/// use helios::content::slugify;
/// assert_eq!(slugify("My First Post!!"), "my-first-post");
/// assert_eq!(slugify(""), "untitled");
/// ```
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let collapsed = NON_ALPHANUMERIC.replace_all(&lower, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether `slug` is lowercase, hyphen-separated ASCII
pub fn is_url_safe(slug: &str) -> bool {
    URL_SAFE.is_match(slug)
}
