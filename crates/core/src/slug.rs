/// Slugify text the way GitHub builds heading anchors.
///
/// Lowercases, drops every character that is not alphanumeric, a space,
/// `-` or `_`, then turns each space into `-`. Other whitespace such as tabs
/// is dropped, and neither leading spaces nor runs of spaces are collapsed.
pub fn github_slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_slug_basic() {
        assert_eq!(github_slug("Hello World"), "hello-world");
        assert_eq!(github_slug("Table of contents"), "table-of-contents");
    }

    #[test]
    fn test_github_slug_strips_punctuation() {
        assert_eq!(github_slug("What's new in v2.0?"), "whats-new-in-v20");
        assert_eq!(github_slug("C++ & Rust"), "c--rust");
    }

    #[test]
    fn test_github_slug_keeps_unicode_letters() {
        assert_eq!(github_slug("Über Café"), "über-café");
    }

    #[test]
    fn test_github_slug_keeps_underscores_and_hyphens() {
        assert_eq!(github_slug("snake_case-name"), "snake_case-name");
    }

    #[test]
    fn test_github_slug_only_maps_spaces() {
        assert_eq!(github_slug("tab\tseparated"), "tabseparated");
        assert_eq!(github_slug(" leading"), "-leading");
        assert_eq!(github_slug("two  spaces"), "two--spaces");
    }

    #[test]
    fn test_github_slug_symbols_only_is_empty() {
        assert_eq!(github_slug("🚀"), "");
    }
}
