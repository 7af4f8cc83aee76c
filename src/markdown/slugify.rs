//! Pure slug generation from heading text.
//!
//! Generates GitHub-style slugs for anchors and output file names.

/// Generate a GitHub-style slug from text.
///
/// Converts text to lowercase, replaces spaces and special characters with hyphens,
/// and removes consecutive/leading/trailing hyphens.
///
/// # Examples
///
/// ```
/// use bindery::markdown::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter-one");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                // Skip other characters
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
