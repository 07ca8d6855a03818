//! Substring matching primitive for term lookup
//!
//! Query terms match index terms by case-insensitive substring containment,
//! not by exact lookup. Keeping that rule behind one type lets a later
//! prefix-trie or n-gram lookup slot in without touching the query
//! evaluator's boolean-AND contract.

/// Case-insensitive literal substring matcher for one query term
///
/// The query text is never interpreted as a pattern; characters that would
/// carry meaning in a regex are matched literally.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    needle: String,
}

impl TermMatcher {
    /// Build a matcher for one whitespace-free query term
    pub fn new(query_term: &str) -> Self {
        TermMatcher {
            needle: query_term.to_lowercase(),
        }
    }

    /// Whether `term` contains the query term anywhere within it
    pub fn matches(&self, term: &str) -> bool {
        term.to_lowercase().contains(&self.needle)
    }

    /// The lowercased needle being matched
    pub fn needle(&self) -> &str {
        &self.needle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_anywhere_in_term() {
        let m = TermMatcher::new("e4");
        assert!(m.matches("e4:e5:Nf3:Nc6:Bb5:a6"));
        assert!(m.matches("Moves:1. e4 e5"));
        assert!(m.matches("e4"));
        assert!(!m.matches("d4:d5"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let m = TermMatcher::new("white:carlsen");
        assert!(m.matches("White:Carlsen"));
        assert!(m.matches("WHITE:CARLSEN"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        // A '.' in the query must not act as a wildcard.
        let m = TermMatcher::new("e.");
        assert!(!m.matches("e4:e5"));
        assert!(m.matches("Moves:1. e. oddity"));

        let m = TermMatcher::new("a*b");
        assert!(!m.matches("aaab"));
        assert!(m.matches("xa*by"));
    }
}
