//! # Built-in Engines
//!
//! Three independent heuristics over the shared lexicon resources. They weigh
//! evidence differently and can disagree.

use super::context::ScoringContext;
use super::engine::{EngineOutput, SentimentEngine};
use super::lexicon::words;
use crate::error::EngineError;

type EngineResult = std::result::Result<EngineOutput, EngineError>;

/// Averages lexicon scores of matched words.
///
/// A negation flips the next sentiment word; an intensifier scales it. Confidence
/// comes from subjectivity (share of sentiment-bearing words): texts that are half
/// opinion are the least certain, purely factual or purely opinionated ones the most.
#[derive(Debug, Clone, Default)]
pub struct LexiconEngine;

impl LexiconEngine {
    /// Engine id
    pub const ID: &'static str = "lexicon";

    /// Create a new lexicon engine
    pub fn new() -> Self {
        Self
    }
}

impl SentimentEngine for LexiconEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn score(&self, text: &str, ctx: &ScoringContext) -> EngineResult {
        let tokens = words(text);
        if tokens.is_empty() {
            return Err(EngineError::NoSignal);
        }

        let lexicon = ctx.lexicon();
        let mut scores: Vec<f64> = Vec::new();
        let mut negate_next = false;
        let mut intensifier = 1.0;

        for token in &tokens {
            if lexicon.is_negation(token) {
                negate_next = true;
                continue;
            }

            if let Some(mult) = lexicon.get_intensifier(token) {
                intensifier = mult;
                continue;
            }

            if let Some(mut score) = lexicon.get_score(token) {
                if negate_next {
                    score = -score;
                    negate_next = false;
                }
                score *= intensifier;
                intensifier = 1.0;
                scores.push(score);
            } else {
                // Modifiers only reach the word right after them
                negate_next = false;
                intensifier = 1.0;
            }
        }

        let polarity = if scores.is_empty() {
            0.0
        } else {
            (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
        };

        let subjectivity = scores.len() as f64 / tokens.len() as f64;
        let confidence = (1.0 - (subjectivity - 0.5).abs() * 2.0).clamp(0.0, 1.0);

        Ok(EngineOutput::new(polarity)
            .with_confidence(confidence)
            .with_extra("subjectivity", subjectivity)
            .with_extra("matched_count", scores.len() as f64)
            .with_extra("word_count", tokens.len() as f64))
    }
}

/// Empirical boost for an intensifier right before a sentiment word
const BOOSTER_INCREMENT: f64 = 0.293;
/// Boost for a capitalized sentiment word in mixed-case text
const CAPS_INCREMENT: f64 = 0.733;
/// Scale applied to a sentiment word preceded by a negation
const NEGATION_SCALAR: f64 = -0.74;
/// Boost per exclamation mark, up to `MAX_EXCLAMATIONS`
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// Lexicon scores are stretched onto a wider valence scale before normalization
const VALENCE_SCALE: f64 = 3.0;
/// How far back negations and intensifiers reach
const LOOKBACK: usize = 3;

/// Sums word valences and squashes the total into a compound score.
///
/// Valences are adjusted by preceding intensifiers and negations within three
/// words, capitalized emphasis, the contrastive "but" (what follows outweighs
/// what precedes) and exclamation marks. The sum is normalized with
/// `x / sqrt(x^2 + 15)`. Confidence is the magnitude of the compound score.
#[derive(Debug, Clone, Default)]
pub struct ValenceEngine;

impl ValenceEngine {
    /// Engine id
    pub const ID: &'static str = "valence";

    /// Normalization constant; larger values compress scores towards zero
    const ALPHA: f64 = 15.0;

    /// Create a new valence engine
    pub fn new() -> Self {
        Self
    }

    fn normalize(sum: f64) -> f64 {
        (sum / (sum * sum + Self::ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

fn is_shouted(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(char::is_alphabetic)
        && !word.chars().any(char::is_lowercase)
}

fn nudge(value: f64, amount: f64) -> f64 {
    if value > 0.0 {
        value + amount
    } else if value < 0.0 {
        value - amount
    } else {
        value
    }
}

impl SentimentEngine for ValenceEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn score(&self, text: &str, ctx: &ScoringContext) -> EngineResult {
        let tokens = words(text);
        if tokens.is_empty() {
            return Err(EngineError::NoSignal);
        }

        let lexicon = ctx.lexicon();
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let shouting_everywhere = tokens.iter().all(|t| is_shouted(t));
        let mut valences = vec![0.0; tokens.len()];

        for (i, word) in lower.iter().enumerate() {
            let Some(base) = lexicon.get_score(word) else {
                continue;
            };
            let mut valence = base * VALENCE_SCALE;

            if !shouting_everywhere && is_shouted(tokens[i]) {
                valence = nudge(valence, CAPS_INCREMENT);
            }

            for distance in 1..=LOOKBACK.min(i) {
                let previous = &lower[i - distance];
                if let Some(mult) = lexicon.get_intensifier(previous) {
                    let damping = 1.0 - 0.05 * (distance - 1) as f64;
                    let boost = if mult >= 1.0 { BOOSTER_INCREMENT } else { -BOOSTER_INCREMENT };
                    valence = nudge(valence, boost * damping);
                }
                if lexicon.is_negation(previous) {
                    valence *= NEGATION_SCALAR;
                }
            }

            valences[i] = valence;
        }

        if let Some(pivot) = lower.iter().position(|w| w == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
        sum = nudge(sum, exclamations as f64 * EXCLAMATION_INCREMENT);
        let compound = Self::normalize(sum);

        let positive: f64 = valences.iter().filter(|v| **v > 0.0).map(|v| v + 1.0).sum();
        let negative: f64 = valences.iter().filter(|v| **v < 0.0).map(|v| 1.0 - v).sum();
        let neutral = valences.iter().filter(|v| **v == 0.0).count() as f64;
        let total = positive + negative + neutral;

        Ok(EngineOutput::new(compound)
            .with_confidence(compound.abs())
            .with_extra("positive", positive / total)
            .with_extra("negative", negative / total)
            .with_extra("neutral", neutral / total)
            .with_extra("word_count", tokens.len() as f64))
    }
}

/// Scores multi-word domain phrases from the context's phrase table.
///
/// Abstains when no phrase occurs, so it never drags a vote towards neutral for
/// lack of evidence. Confidence grows with the number of phrase hits.
#[derive(Debug, Clone, Default)]
pub struct PhraseEngine;

impl PhraseEngine {
    /// Engine id
    pub const ID: &'static str = "phrase";

    /// Create a new phrase engine
    pub fn new() -> Self {
        Self
    }
}

impl SentimentEngine for PhraseEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn score(&self, text: &str, ctx: &ScoringContext) -> EngineResult {
        let phrases = ctx
            .phrases()
            .ok_or_else(|| EngineError::MissingResource("phrase table".to_string()))?;

        let found = phrases.find(text);
        if found.is_empty() {
            return Err(EngineError::NoSignal);
        }

        let hits: usize = found.iter().map(|(_, _, count)| count).sum();
        let weighted: f64 = found
            .iter()
            .map(|(_, score, count)| score * *count as f64)
            .sum();
        let polarity = (weighted / hits as f64).clamp(-1.0, 1.0);
        let confidence = 1.0 - 1.0 / (1.0 + hits as f64);

        Ok(EngineOutput::new(polarity)
            .with_confidence(confidence)
            .with_extra("phrase_hits", hits as f64)
            .with_extra("distinct_phrases", found.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::lexicon::PhraseTable;

    const ACME: &str = "Acme Corp reported record profits and strong guidance";

    #[test]
    fn test_lexicon_positive() {
        let ctx = ScoringContext::new();
        let output = LexiconEngine::new().score(ACME, &ctx).unwrap();
        // record 0.6, profits 0.6, strong 0.5
        assert!((output.polarity - 1.7 / 3.0).abs() < 1e-9);
        assert!((output.confidence.unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(output.extra["matched_count"], 3.0);
    }

    #[test]
    fn test_lexicon_negation_and_intensifier() {
        let ctx = ScoringContext::new();
        let engine = LexiconEngine::new();
        let plain = engine.score("the outlook is strong", &ctx).unwrap();
        let negated = engine.score("the outlook is not strong", &ctx).unwrap();
        let boosted = engine.score("the outlook is extremely strong", &ctx).unwrap();

        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!(boosted.polarity > plain.polarity);
    }

    #[test]
    fn test_lexicon_no_sentiment_words() {
        let ctx = ScoringContext::new();
        let output = LexiconEngine::new().score("The meeting is on Tuesday", &ctx).unwrap();
        assert_eq!(output.polarity, 0.0);
        assert_eq!(output.confidence, Some(0.0));
    }

    #[test]
    fn test_empty_text_abstains() {
        let ctx = ScoringContext::new();
        assert_eq!(LexiconEngine::new().score("", &ctx), Err(EngineError::NoSignal));
        assert_eq!(ValenceEngine::new().score("  ", &ctx), Err(EngineError::NoSignal));
        assert_eq!(PhraseEngine::new().score("", &ctx), Err(EngineError::NoSignal));
    }

    #[test]
    fn test_valence_compound() {
        let ctx = ScoringContext::new();
        let output = ValenceEngine::new().score(ACME, &ctx).unwrap();
        let expected = 5.1 / (5.1f64 * 5.1 + 15.0).sqrt();
        assert!((output.polarity - expected).abs() < 1e-9);
        assert_eq!(output.confidence, Some(output.polarity.abs()));
        let shares = output.extra["positive"] + output.extra["negative"] + output.extra["neutral"];
        assert!((shares - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_valence_negation_flips() {
        let ctx = ScoringContext::new();
        let engine = ValenceEngine::new();
        let plain = engine.score("results were good", &ctx).unwrap();
        let negated = engine.score("results were not good", &ctx).unwrap();
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn test_valence_emphasis() {
        let ctx = ScoringContext::new();
        let engine = ValenceEngine::new();
        let plain = engine.score("a good quarter", &ctx).unwrap();
        let caps = engine.score("a GOOD quarter", &ctx).unwrap();
        let excited = engine.score("a good quarter!!", &ctx).unwrap();
        assert!(caps.polarity > plain.polarity);
        assert!(excited.polarity > plain.polarity);
    }

    #[test]
    fn test_valence_but_shifts_weight() {
        let ctx = ScoringContext::new();
        let output = ValenceEngine::new()
            .score("revenue was strong but the outlook is weak", &ctx)
            .unwrap();
        assert!(output.polarity < 0.0);
    }

    #[test]
    fn test_phrase_engine() {
        let ctx = ScoringContext::new();
        let output = PhraseEngine::new().score(ACME, &ctx).unwrap();
        assert!((output.polarity - 0.75).abs() < 1e-9);
        assert!((output.confidence.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_phrase_engine_abstains_and_needs_table() {
        let ctx = ScoringContext::new();
        assert_eq!(
            PhraseEngine::new().score("nothing notable here", &ctx),
            Err(EngineError::NoSignal)
        );

        let bare = ScoringContext::new().without_phrases();
        assert!(matches!(
            PhraseEngine::new().score(ACME, &bare),
            Err(EngineError::MissingResource(_))
        ));

        let custom = ScoringContext::new().with_phrases(PhraseTable::empty());
        assert_eq!(PhraseEngine::new().score(ACME, &custom), Err(EngineError::NoSignal));
    }
}
