//! # Text Normalization
//!
//! Strips markup, links and noise from raw news text before matching and scoring.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HTML_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").unwrap());
static NOISE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?\-']").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Entities decoded after tag removal; everything else is left to the noise filter
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
];

/// Text normalizer for news headlines and bodies
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw text
    ///
    /// Steps:
    /// 1. Unicode normalization (NFC)
    /// 2. Remove HTML tags
    /// 3. Decode common HTML entities
    /// 4. Remove URLs
    /// 5. Strip punctuation other than `. , ! ? - '`
    /// 6. Collapse whitespace and trim
    ///
    /// Case is preserved. Empty input yields an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let normalized: String = raw.nfc().collect();

        // Tags become spaces so "<p>a</p><p>b</p>" does not fuse into "ab"
        let mut text = HTML_TAG_REGEX.replace_all(&normalized, " ").into_owned();

        for (entity, replacement) in HTML_ENTITIES {
            if text.contains(entity) {
                text = text.replace(entity, replacement);
            }
        }

        let no_urls = URL_REGEX.replace_all(&text, " ");
        let no_noise = NOISE_REGEX.replace_all(&no_urls, "");
        let clean = WHITESPACE_REGEX.replace_all(&no_noise, " ");

        clean.trim().to_string()
    }

    /// Normalize optional text; `None` yields an empty string
    pub fn normalize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|text| self.normalize(text)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("  Hello   World  "), "Hello World");
    }

    #[test]
    fn test_remove_html() {
        let normalizer = TextNormalizer::new();
        let text = "<p>Acme <b>beats</b> estimates</p><p>again</p>";
        assert_eq!(normalizer.normalize(text), "Acme beats estimates again");
    }

    #[test]
    fn test_decode_entities() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Profits &amp; losses"), "Profits losses");
        assert_eq!(normalizer.normalize("Acme&#39;s quarter"), "Acme's quarter");
    }

    #[test]
    fn test_remove_urls() {
        let normalizer = TextNormalizer::new();
        let text = "Read more at https://example.com/story?id=1 or www.example.org today!";
        assert_eq!(normalizer.normalize(text), "Read more at or today!");
    }

    #[test]
    fn test_strip_noise_keeps_basic_punctuation() {
        let normalizer = TextNormalizer::new();
        let text = "Q3 results: up 12%!! (record) - CEO's #1 pick, right? $ACME";
        assert_eq!(
            normalizer.normalize(text),
            "Q3 results up 12!! record - CEO's 1 pick, right? ACME"
        );
    }

    #[test]
    fn test_empty_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   \n\t "), "");
        assert_eq!(normalizer.normalize_opt(None), "");
        assert_eq!(normalizer.normalize("<br/> <hr>"), "");
    }

    #[test]
    fn test_unicode_preserved() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Société Générale rallies"), "Société Générale rallies");
    }
}
