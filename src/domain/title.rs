//! Title normalization
//!
//! Page titles become directory and file names, so characters that break
//! paths or shell usage are replaced. All functions here are deterministic
//! and idempotent.

/// Normalize a page title for single-page and report exports
///
/// `/` -> `-`, `,` removed, `&` -> `And`, `:` -> `-`.
///
/// ```
/// use confluence_dump::domain::title::normalize_title;
///
/// assert_eq!(normalize_title("A/B, C & D:E"), "A-B C And D-E");
/// ```
pub fn normalize_title(title: &str) -> String {
    title
        .replace('/', "-")
        .replace(',', "")
        .replace('&', "And")
        .replace(':', "-")
}

/// Normalize a page title for space and label exports
///
/// Same as [`normalize_title`], plus spaces become `_`.
///
/// ```
/// use confluence_dump::domain::title::normalize_space_title;
///
/// assert_eq!(normalize_space_title("A/B, C & D:E"), "A-B_C_And_D-E");
/// ```
pub fn normalize_space_title(title: &str) -> String {
    normalize_title(title).replace(' ', "_")
}

/// HTML filename for a page-properties child
pub fn child_filename(name: &str) -> String {
    format!("{}.html", normalize_space_title(name))
}
