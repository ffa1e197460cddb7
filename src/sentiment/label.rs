//! Sentiment labels and the polarity threshold shared by engines, consensus and daily summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-width of the neutral band around zero polarity
pub const NEUTRAL_BAND: f64 = 0.1;

/// Sentiment label classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Polarity above the neutral band
    Positive,
    /// Polarity below the neutral band
    Negative,
    /// Polarity within the neutral band
    Neutral,
}

impl SentimentLabel {
    /// Tie-break precedence for consensus votes, highest first
    pub const PRECEDENCE: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Classify a polarity: `> 0.1` positive, `< -0.1` negative, otherwise neutral
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if polarity < -NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(SentimentLabel::from_polarity(0.11), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.11), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(1.0), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(-1.0), SentimentLabel::Negative);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
        let label: SentimentLabel = serde_json::from_str("\"positive\"").unwrap();
        assert_eq!(label, SentimentLabel::Positive);
    }

    #[test]
    fn test_display() {
        assert_eq!(SentimentLabel::Neutral.to_string(), "neutral");
    }
}
