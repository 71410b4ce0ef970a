//! Filesystem-safe slugs for URL path segments and query strings

use unicode_normalization::UnicodeNormalization;

/// Converts a path segment or query string into a lowercase slug
///
/// The text is decomposed (NFKD) and reduced to ASCII, which strips
/// diacritics. `=` becomes `-` before cleanup so `key=value` pairs stay
/// readable. Everything except ASCII letters, digits, `_`, `-` and whitespace
/// is then removed, the result is trimmed and lowercased, and each run of
/// hyphens and whitespace collapses to a single `-`.
///
/// # Examples
///
/// ```
/// use sitegrab::url::slugify;
///
/// assert_eq!(slugify("x=1&y=2"), "x-1y-2");
/// assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
/// ```
pub fn slugify(text: &str) -> String {
    let cleaned: String = text
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '=' { '-' } else { c })
        .filter(|&c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || is_space(c))
        .collect();

    let lowered = cleaned.trim_matches(is_space).to_ascii_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if c == '-' || is_space(c) {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }

    slug
}

/// ASCII whitespace, including vertical tab and the information separators
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1f')
}
