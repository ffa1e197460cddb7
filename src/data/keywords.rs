//! # Keyword Extraction
//!
//! Frequency-based salient terms attached to every engine score as explanatory metadata.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Default number of keywords returned
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Tokens shorter than this are discarded
pub const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "this", "that",
    "these", "those",
];

/// Keyword extractor
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: HashSet<&'static str>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Create an extractor with the default stop-word set
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Extract up to `max_keywords` terms, most frequent first.
    ///
    /// Ties keep the order in which the terms first appear.
    pub fn extract(&self, text: &str, max_keywords: usize) -> Vec<String> {
        if text.is_empty() || max_keywords == 0 {
            return Vec::new();
        }

        let lower = text.to_lowercase();
        // term -> (count, first occurrence)
        let mut frequencies: HashMap<&str, (usize, usize)> = HashMap::new();

        for (position, word) in WORD_REGEX.find_iter(&lower).map(|m| m.as_str()).enumerate() {
            if word.chars().count() < MIN_KEYWORD_CHARS || self.stop_words.contains(word) {
                continue;
            }
            frequencies.entry(word).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = frequencies
            .into_iter()
            .map(|(word, (count, first))| (word, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max_keywords)
            .map(|(word, _, _)| word.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_order() {
        let extractor = KeywordExtractor::new();
        let text = "Acme profit rises. Acme guidance strong, profit outlook raised. Acme!";
        let keywords = extractor.extract(text, 3);
        assert_eq!(keywords, vec!["acme", "profit", "rises"]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("zeta alpha mid zeta alpha mid", 10);
        assert_eq!(keywords, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_stop_words_and_short_tokens_removed() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("The CEO is on it and we go up", 10);
        assert_eq!(keywords, vec!["ceo"]);
    }

    #[test]
    fn test_limit_and_empty() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.extract("", 10).is_empty());
        assert!(extractor.extract("plenty of words here", 0).is_empty());
        assert_eq!(extractor.extract("one two three four five", 2).len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let extractor = KeywordExtractor::new();
        let text = "record profits record revenue strong guidance strong demand";
        let first = extractor.extract(text, DEFAULT_MAX_KEYWORDS);
        for _ in 0..5 {
            assert_eq!(extractor.extract(text, DEFAULT_MAX_KEYWORDS), first);
        }
        assert_eq!(first[..2], ["record".to_string(), "strong".to_string()]);
    }
}
