//! Substring search helpers.
//!
//! Role search is a plain case-insensitive "contains" match on name and
//! description. The user's term is always bound as a query parameter; these
//! helpers make sure LIKE metacharacters inside the term match literally.

/// Escape character used in `ILIKE ... ESCAPE '\'` clauses.
pub const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character itself.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Build a `%term%` pattern for a "contains" match.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// In-process equivalent of `haystack ILIKE '%needle%'`.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_terms_are_unchanged() {
        assert_eq!(contains_pattern("edit"), "%edit%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn quotes_pass_through_untouched() {
        // Quotes are harmless once bound as a parameter.
        assert_eq!(escape_like("\" OR 1=1 --"), "\" OR 1=1 --");
    }

    #[test]
    fn contains_ignores_case() {
        assert!(contains_ignore_case("Content Editor", "EDIT"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Viewer", "edit"));
    }
}
