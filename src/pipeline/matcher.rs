//! Text matching primitives used by the triage rules.
//!
//! Haystacks are expected to be lower-cased by the caller. Phrase matching is
//! plain substring containment; word matching requires a word boundary on
//! both sides so that short keywords do not fire inside longer words
//! ("add" never matches "address"). Boundaries are ASCII: only `[0-9A-Za-z_]`
//! count as word characters, so an accented letter next to a keyword does
//! not block the match.

use regex::Regex;

/// A compiled set of whole-word patterns.
#[derive(Debug, Clone)]
pub struct WordSet {
    patterns: Vec<Regex>,
}

impl WordSet {
    /// Compile `words` into case-insensitive, ASCII word-bounded patterns.
    ///
    /// Each word is escaped first, so regex metacharacters in a keyword are
    /// matched literally.
    pub fn new(words: &[&str]) -> Result<Self, regex::Error> {
        let patterns = words
            .iter()
            .map(|w| Regex::new(&format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(w))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True if any word occurs in `text` as a whole word.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// True if any phrase occurs in `text` as a contiguous substring.
pub fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_any_word(text: &str, words: &[&str]) -> bool {
        WordSet::new(words).unwrap().matches(text)
    }

    #[test]
    fn phrase_matches_substring() {
        assert!(contains_any_phrase("this is not working at all", &["not working"]));
        assert!(contains_any_phrase("crashing", &["crash"]));
        assert!(!contains_any_phrase("all good", &["not working"]));
    }

    #[test]
    fn word_requires_boundaries() {
        assert!(contains_any_word("please add it", &["add"]));
        assert!(!contains_any_word("change my email address", &["add"]));
        assert!(!contains_any_word("discard this", &["card"]));
        assert!(contains_any_word("my card was declined", &["card"]));
    }

    #[test]
    fn word_is_case_insensitive() {
        assert!(contains_any_word("INVOICE attached", &["invoice"]));
    }

    #[test]
    fn word_matches_next_to_punctuation() {
        assert!(contains_any_word("refund?", &["refund"]));
        assert!(contains_any_word("(billing)", &["billing"]));
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert!(contains_any_word("version c++ please", &["c"]));
        assert!(!contains_any_word("abc", &["a.c"]));
        assert!(contains_any_word("use a.c here", &["a.c"]));
    }

    #[test]
    fn empty_text_never_matches() {
        assert!(!contains_any_phrase("", &["crash", "urgent"]));
        assert!(!contains_any_word("", &["crash", "urgent"]));
    }

    #[test]
    fn empty_needles_never_match() {
        assert!(!contains_any_phrase("anything", &[]));
        assert!(!contains_any_word("anything", &[]));
        assert!(!WordSet::new(&[]).unwrap().matches(""));
    }

    #[test]
    fn word_boundary_is_ascii() {
        // Non-ASCII letters are not word characters for the boundary check.
        assert!(contains_any_word("éadd", &["add"]));
        assert!(contains_any_word("refundé", &["refund"]));
        assert!(!contains_any_word("address", &["add"]));
    }
}
