//! # Financial Lexicon
//!
//! Word and phrase sentiment resources for rule-based scoring of business news.

use std::collections::{HashMap, HashSet};

/// Split normalized text into words, trimming punctuation at word edges.
///
/// Inner apostrophes and hyphens survive (`don't`, `year-over-year`).
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Financial sentiment lexicon
///
/// Contains word-sentiment mappings specific to company news.
#[derive(Debug, Clone)]
pub struct FinancialLexicon {
    /// Word to sentiment score mapping
    words: HashMap<String, f64>,
    /// Negation words
    negations: HashSet<String>,
    /// Intensifier words
    intensifiers: HashMap<String, f64>,
}

impl Default for FinancialLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialLexicon {
    /// Create a new financial lexicon with default words
    pub fn new() -> Self {
        let positive_words = [
            ("bullish", 0.8),
            ("surge", 0.7),
            ("rally", 0.7),
            ("soar", 0.8),
            ("gain", 0.5),
            ("profit", 0.6),
            ("profitable", 0.6),
            ("growth", 0.6),
            ("grow", 0.5),
            ("rise", 0.5),
            ("increase", 0.5),
            ("improve", 0.5),
            ("outperform", 0.7),
            ("beat", 0.6),
            ("exceed", 0.6),
            ("strong", 0.5),
            ("robust", 0.5),
            ("positive", 0.5),
            ("optimistic", 0.6),
            ("upbeat", 0.6),
            ("confident", 0.5),
            ("record", 0.6),
            ("high", 0.3),
            ("upgrade", 0.6),
            ("boost", 0.5),
            ("expand", 0.4),
            ("breakout", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("success", 0.6),
            ("successful", 0.6),
            ("win", 0.5),
            ("milestone", 0.5),
            ("approval", 0.4),
            ("innovative", 0.5),
            ("good", 0.5),
            ("great", 0.7),
            ("excellent", 0.8),
            ("best", 0.6),
        ];

        let negative_words = [
            ("bearish", -0.8),
            ("crash", -0.9),
            ("plunge", -0.8),
            ("tumble", -0.7),
            ("slump", -0.7),
            ("sink", -0.6),
            ("drop", -0.6),
            ("fall", -0.5),
            ("decline", -0.6),
            ("loss", -0.6),
            ("down", -0.4),
            ("decrease", -0.5),
            ("weak", -0.5),
            ("negative", -0.5),
            ("pessimistic", -0.6),
            ("concern", -0.5),
            ("worry", -0.5),
            ("fear", -0.6),
            ("risk", -0.4),
            ("volatile", -0.3),
            ("uncertainty", -0.5),
            ("miss", -0.6),
            ("disappoint", -0.7),
            ("underperform", -0.6),
            ("downgrade", -0.6),
            ("slash", -0.5),
            ("cut", -0.4),
            ("layoff", -0.6),
            ("crisis", -0.8),
            ("warning", -0.5),
            ("trouble", -0.6),
            ("problem", -0.5),
            ("fail", -0.7),
            ("failure", -0.7),
            ("lawsuit", -0.6),
            ("probe", -0.5),
            ("investigation", -0.5),
            ("recall", -0.5),
            ("breach", -0.7),
            ("default", -0.7),
            ("bankrupt", -0.9),
            ("bankruptcy", -0.9),
            ("scandal", -0.8),
            ("fraud", -0.9),
            ("bad", -0.5),
            ("poor", -0.5),
            ("worst", -0.7),
        ];

        let words = positive_words
            .into_iter()
            .chain(negative_words)
            .map(|(word, score)| (word.to_string(), score))
            .collect();

        let negations = [
            "not", "no", "never", "neither", "nobody", "nothing", "nowhere", "none", "cannot",
            "cant", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
            "wouldn't", "wouldnt", "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt",
            "weren't", "werent", "hardly", "barely", "without",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let intensifiers = [
            ("very", 1.5),
            ("extremely", 2.0),
            ("highly", 1.5),
            ("significantly", 1.5),
            ("substantially", 1.5),
            ("sharply", 1.6),
            ("dramatically", 1.8),
            ("massively", 1.8),
            ("hugely", 1.7),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("marginally", 0.5),
            ("relatively", 0.8),
        ]
        .into_iter()
        .map(|(word, mult)| (word.to_string(), mult))
        .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    /// Get sentiment score for a word, falling back to simple inflection stripping
    /// (`profits` -> `profit`, `surged` -> `surge`, `plunging` -> `plunge`)
    pub fn get_score(&self, word: &str) -> Option<f64> {
        let word = word.to_lowercase();
        if let Some(score) = self.words.get(&word) {
            return Some(*score);
        }
        if word.chars().count() <= 4 {
            return None;
        }
        inflection_candidates(&word)
            .into_iter()
            .find_map(|stem| self.words.get(&stem).copied())
    }

    /// Check if a word is a negation
    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(&word.to_lowercase())
    }

    /// Get intensifier multiplier
    pub fn get_intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(&word.to_lowercase()).copied()
    }

    /// Add a custom word to the lexicon
    pub fn add_word(&mut self, word: &str, score: f64) {
        self.words.insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
    }

    /// Number of scored words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon holds no scored words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn inflection_candidates(word: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(stem) = word.strip_suffix("ies") {
        candidates.push(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('s') {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('d') {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix("ed") {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix("ing") {
        candidates.push(stem.to_string());
        candidates.push(format!("{stem}e"));
    }
    candidates
}

/// Multi-word phrases with domain-specific sentiment
///
/// Phrases carry meaning their individual words do not ("guidance cut",
/// "beat expectations") and are matched on whole-word boundaries.
#[derive(Debug, Clone)]
pub struct PhraseTable {
    /// Phrase tokens and score
    phrases: Vec<(Vec<String>, f64)>,
}

impl Default for PhraseTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseTable {
    /// Create a phrase table with default company-news phrases
    pub fn new() -> Self {
        let phrases = [
            ("record profits", 0.8),
            ("record profit", 0.8),
            ("record revenue", 0.8),
            ("record earnings", 0.8),
            ("strong guidance", 0.7),
            ("raised guidance", 0.7),
            ("raises guidance", 0.7),
            ("beat expectations", 0.7),
            ("beats expectations", 0.7),
            ("tops estimates", 0.7),
            ("beats estimates", 0.7),
            ("dividend increase", 0.6),
            ("share buyback", 0.5),
            ("all-time high", 0.7),
            ("all time high", 0.7),
            ("upgraded to buy", 0.7),
            ("strong demand", 0.6),
            ("market share gains", 0.6),
            ("guidance cut", -0.7),
            ("cuts guidance", -0.7),
            ("lowered guidance", -0.7),
            ("lowers guidance", -0.7),
            ("profit warning", -0.8),
            ("missed expectations", -0.7),
            ("misses expectations", -0.7),
            ("misses estimates", -0.7),
            ("job cuts", -0.6),
            ("mass layoffs", -0.7),
            ("data breach", -0.8),
            ("class action", -0.6),
            ("downgraded to sell", -0.7),
            ("files for bankruptcy", -0.9),
            ("chapter 11", -0.9),
            ("accounting irregularities", -0.8),
            ("product recall", -0.6),
            ("weak demand", -0.6),
        ];

        Self {
            phrases: phrases
                .into_iter()
                .map(|(phrase, score)| (split_phrase(phrase), score))
                .collect(),
        }
    }

    /// Create an empty phrase table
    pub fn empty() -> Self {
        Self { phrases: Vec::new() }
    }

    /// Add a custom phrase
    pub fn add_phrase(&mut self, phrase: &str, score: f64) {
        let tokens = split_phrase(phrase);
        if !tokens.is_empty() {
            self.phrases.push((tokens, score.clamp(-1.0, 1.0)));
        }
    }

    /// Find phrase occurrences in text
    ///
    /// Returns `(phrase, score, occurrences)` for each phrase found, in table order.
    pub fn find(&self, text: &str) -> Vec<(String, f64, usize)> {
        let tokens: Vec<String> = words(text).into_iter().map(str::to_lowercase).collect();

        self.phrases
            .iter()
            .filter_map(|(phrase, score)| {
                let occurrences = tokens
                    .windows(phrase.len())
                    .filter(|window| *window == phrase.as_slice())
                    .count();
                (occurrences > 0).then(|| (phrase.join(" "), *score, occurrences))
            })
            .collect()
    }

    /// Number of phrases in the table
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

fn split_phrase(phrase: &str) -> Vec<String> {
    words(phrase).into_iter().map(str::to_lowercase).collect()
}
