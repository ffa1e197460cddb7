//! # Consensus Resolver
//!
//! Reconciles the scores of every engine that ran on one text item into a single judgment.

use super::engine::EngineScore;
use super::label::SentimentLabel;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engine votes per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl VoteTally {
    /// Count labels
    pub fn from_labels<I: IntoIterator<Item = SentimentLabel>>(labels: I) -> Self {
        let mut tally = Self::default();
        for label in labels {
            match label {
                SentimentLabel::Positive => tally.positive += 1,
                SentimentLabel::Negative => tally.negative += 1,
                SentimentLabel::Neutral => tally.neutral += 1,
            }
        }
        tally
    }

    /// Votes for one label
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Total votes cast
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Label with the most votes and its count.
    ///
    /// Ties go to the label ranked higher in [`SentimentLabel::PRECEDENCE`]
    /// (positive, then negative, then neutral).
    pub fn winner(&self) -> (SentimentLabel, usize) {
        let max = self.positive.max(self.negative).max(self.neutral);
        let label = SentimentLabel::PRECEDENCE
            .into_iter()
            .find(|label| self.get(*label) == max)
            .unwrap_or(SentimentLabel::Neutral);
        (label, max)
    }
}

/// Combined judgment for one text item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Originating text item
    pub text_id: String,
    /// Entity the item was matched to
    pub entity_id: String,
    /// Item publication time, used for daily grouping
    pub published_at: DateTime<Utc>,
    /// Unweighted mean of engine polarities
    pub avg_polarity: f64,
    /// Majority label across engines
    pub consensus_label: SentimentLabel,
    /// Share of engines voting for the consensus label
    pub agreement_ratio: f64,
    /// Engines that contributed a score
    pub engine_count: usize,
    /// Votes per label
    pub votes: VoteTally,
    /// Mean of the confidences engines reported, if any did
    pub mean_confidence: Option<f64>,
}

impl ConsensusResult {
    /// Persistence key
    pub fn key(&self) -> (&str, &str) {
        (self.text_id.as_str(), self.entity_id.as_str())
    }
}

/// Consensus resolver
///
/// Engines are treated as equally reliable: polarities are averaged without
/// weights and each engine casts one label vote.
#[derive(Debug, Clone, Default)]
pub struct ConsensusResolver;

impl ConsensusResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve the scores for one text item; at least one score is required
    pub fn resolve(
        &self,
        text_id: &str,
        entity_id: &str,
        published_at: DateTime<Utc>,
        scores: &[EngineScore],
    ) -> Result<ConsensusResult> {
        if scores.is_empty() {
            return Err(Error::InsufficientData(format!(
                "no engine scores for text {}",
                text_id
            )));
        }

        let engine_count = scores.len();
        let avg_polarity = scores.iter().map(|s| s.polarity).sum::<f64>() / engine_count as f64;

        let votes = VoteTally::from_labels(scores.iter().map(|s| s.label));
        let (consensus_label, max_votes) = votes.winner();
        let agreement_ratio = max_votes as f64 / engine_count as f64;

        let confidences: Vec<f64> = scores.iter().filter_map(|s| s.confidence).collect();
        let mean_confidence = if confidences.is_empty() {
            None
        } else {
            Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
        };

        Ok(ConsensusResult {
            text_id: text_id.to_string(),
            entity_id: entity_id.to_string(),
            published_at,
            avg_polarity,
            consensus_label,
            agreement_ratio,
            engine_count,
            votes,
            mean_confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(polarities: &[f64]) -> Vec<EngineScore> {
        polarities
            .iter()
            .enumerate()
            .map(|(i, p)| EngineScore::new(format!("engine{}", i), *p))
            .collect()
    }

    fn resolve(polarities: &[f64]) -> ConsensusResult {
        ConsensusResolver::new()
            .resolve("t1", "acme", Utc::now(), &scores(polarities))
            .unwrap()
    }

    #[test]
    fn test_empty_scores_rejected() {
        let err = ConsensusResolver::new()
            .resolve("t1", "acme", Utc::now(), &[])
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_unanimous() {
        let result = resolve(&[0.5, 0.7, 0.3]);
        assert_eq!(result.consensus_label, SentimentLabel::Positive);
        assert_eq!(result.agreement_ratio, 1.0);
        assert_eq!(result.engine_count, 3);
        assert!((result.avg_polarity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_three_way_tie_prefers_positive() {
        for _ in 0..10 {
            let result = resolve(&[0.2, -0.3, 0.05]);
            assert_eq!(result.consensus_label, SentimentLabel::Positive);
            assert!((result.agreement_ratio - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_consensus_label_differs_from_average_label() {
        let result = resolve(&[0.2, -0.3, 0.05]);
        assert!((result.avg_polarity - (-0.05 / 3.0)).abs() < 1e-12);
        assert_eq!(SentimentLabel::from_polarity(result.avg_polarity), SentimentLabel::Neutral);
        assert_eq!(result.consensus_label, SentimentLabel::Positive);
    }

    #[test]
    fn test_two_two_tie_prefers_negative_over_neutral() {
        let result = resolve(&[-0.5, -0.4, 0.0, 0.05]);
        assert_eq!(result.consensus_label, SentimentLabel::Negative);
        assert_eq!(result.agreement_ratio, 0.5);
    }

    #[test]
    fn test_two_two_tie_prefers_positive_over_neutral() {
        let result = resolve(&[0.5, 0.4, 0.0, 0.05]);
        assert_eq!(result.consensus_label, SentimentLabel::Positive);
        assert_eq!(result.agreement_ratio, 0.5);
        assert_eq!(result.votes, VoteTally { positive: 2, negative: 0, neutral: 2 });
    }

    #[test]
    fn test_positive_negative_tie() {
        let result = resolve(&[0.5, -0.5, 0.6, -0.6]);
        assert_eq!(result.consensus_label, SentimentLabel::Positive);
    }

    #[test]
    fn test_majority_neutral() {
        let result = resolve(&[0.0, 0.05, 0.9]);
        assert_eq!(result.consensus_label, SentimentLabel::Neutral);
        assert_eq!(result.votes, VoteTally { positive: 1, negative: 0, neutral: 2 });
    }

    #[test]
    fn test_mean_confidence() {
        let scores = vec![
            EngineScore::new("a", 0.4).with_confidence(0.8),
            EngineScore::new("b", 0.4),
            EngineScore::new("c", 0.4).with_confidence(0.4),
        ];
        let result = ConsensusResolver::new()
            .resolve("t1", "acme", Utc::now(), &scores)
            .unwrap();
        assert!((result.mean_confidence.unwrap() - 0.6).abs() < 1e-12);

        let bare = resolve(&[0.4]);
        assert_eq!(bare.mean_confidence, None);
        assert_eq!(bare.key(), ("t1", "acme"));
    }
}
