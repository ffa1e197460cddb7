//! # Daily Aggregator
//!
//! Rolls per-item consensus results into one summary per entity and UTC calendar day.

use super::consensus::ConsensusResult;
use super::label::SentimentLabel;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Daily sentiment summary for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Tracked entity
    pub entity_id: String,
    /// UTC calendar day
    pub date: NaiveDate,
    /// Mean of the items' average polarities
    pub avg_polarity: f64,
    /// Label derived from `avg_polarity`, not from the label counts
    pub label: SentimentLabel,
    /// Number of consensus results (one per item)
    pub item_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

impl DailySummary {
    /// Persistence key
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.entity_id.as_str(), self.date)
    }

    /// Check the summary's invariants.
    ///
    /// Every item contributes exactly one label, so the counts must add up to the
    /// item count. A label that disagrees with the polarity threshold is logged
    /// but accepted, since summaries may come from older pipelines.
    pub fn validate(&self) -> Result<()> {
        let labelled = self.positive_count + self.negative_count + self.neutral_count;
        if labelled != self.item_count {
            return Err(Error::DataIntegrity(format!(
                "summary for {} on {} has item_count {} but {} labelled items",
                self.entity_id, self.date, self.item_count, labelled
            )));
        }
        if !self.avg_polarity.is_finite() || !(-1.0..=1.0).contains(&self.avg_polarity) {
            return Err(Error::DataIntegrity(format!(
                "summary for {} on {} has polarity {} outside [-1, 1]",
                self.entity_id, self.date, self.avg_polarity
            )));
        }

        let expected = SentimentLabel::from_polarity(self.avg_polarity);
        if expected != self.label {
            warn!(
                entity = %self.entity_id,
                date = %self.date,
                "summary label {} does not match polarity {:.4} (expected {})",
                self.label,
                self.avg_polarity,
                expected
            );
        }
        Ok(())
    }
}

/// Daily aggregator
///
/// Summaries are recomputed from scratch on every call. Results are deduplicated
/// by text id and summed in text id order. When a text appears more than once the
/// record with the latest `published_at` is kept, then the higher polarity, then the
/// higher label, so the same result set yields a bit-identical summary regardless of
/// the order it arrives in.
///
/// In `summarize` and `summarize_all` an entity-day whose summary fails validation
/// is logged and left out; the other entity-days are still returned.
#[derive(Debug, Clone, Default)]
pub struct DailyAggregator;

impl DailyAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self
    }

    /// Summarize one entity-day from its consensus results
    pub fn aggregate(
        &self,
        entity_id: &str,
        date: NaiveDate,
        results: &[&ConsensusResult],
    ) -> Result<DailySummary> {
        let mut by_text: BTreeMap<&str, &ConsensusResult> = BTreeMap::new();
        for result in results {
            if result.entity_id != entity_id || result.published_at.date_naive() != date {
                return Err(Error::InvalidInput(format!(
                    "result for text {} belongs to {} on {}, not {} on {}",
                    result.text_id,
                    result.entity_id,
                    result.published_at.date_naive(),
                    entity_id,
                    date
                )));
            }
            by_text
                .entry(result.text_id.as_str())
                .and_modify(|kept| {
                    if supersedes(result, kept) {
                        *kept = *result;
                    }
                })
                .or_insert(*result);
        }

        if by_text.is_empty() {
            return Err(Error::AggregationGap {
                entity_id: entity_id.to_string(),
                date,
            });
        }

        let item_count = by_text.len();
        let avg_polarity =
            by_text.values().map(|r| r.avg_polarity).sum::<f64>() / item_count as f64;

        let count = |label: SentimentLabel| {
            by_text
                .values()
                .filter(|r| r.consensus_label == label)
                .count()
        };

        let summary = DailySummary {
            entity_id: entity_id.to_string(),
            date,
            avg_polarity,
            label: SentimentLabel::from_polarity(avg_polarity),
            item_count,
            positive_count: count(SentimentLabel::Positive),
            negative_count: count(SentimentLabel::Negative),
            neutral_count: count(SentimentLabel::Neutral),
        };
        summary.validate()?;
        Ok(summary)
    }

    /// Summaries for `date`, one per entity, sorted by entity id.
    ///
    /// With `entity_id` set only that entity is summarized. An entity without
    /// results that day gets no summary rather than a zero-filled one.
    pub fn summarize(
        &self,
        results: &[ConsensusResult],
        date: NaiveDate,
        entity_id: Option<&str>,
    ) -> Result<Vec<DailySummary>> {
        let mut groups: BTreeMap<&str, Vec<&ConsensusResult>> = BTreeMap::new();
        for result in results {
            if result.published_at.date_naive() != date {
                continue;
            }
            if entity_id.is_some_and(|id| id != result.entity_id) {
                continue;
            }
            groups.entry(result.entity_id.as_str()).or_default().push(result);
        }

        if let Some(id) = entity_id {
            if groups.is_empty() {
                debug!(entity = id, %date, "aggregation gap, no summary produced");
                return Ok(Vec::new());
            }
        }

        let summaries: Vec<DailySummary> = groups
            .into_iter()
            .filter_map(|(entity, group)| self.aggregate_or_log(entity, date, &group))
            .collect();

        info!(%date, count = summaries.len(), "generated daily summaries");
        Ok(summaries)
    }

    /// Summaries for every entity-day present, sorted by date then entity id
    pub fn summarize_all(&self, results: &[ConsensusResult]) -> Result<Vec<DailySummary>> {
        let mut groups: BTreeMap<(NaiveDate, &str), Vec<&ConsensusResult>> = BTreeMap::new();
        for result in results {
            groups
                .entry((result.published_at.date_naive(), result.entity_id.as_str()))
                .or_default()
                .push(result);
        }

        Ok(groups
            .into_iter()
            .filter_map(|((date, entity), group)| self.aggregate_or_log(entity, date, &group))
            .collect())
    }

    fn aggregate_or_log(
        &self,
        entity_id: &str,
        date: NaiveDate,
        results: &[&ConsensusResult],
    ) -> Option<DailySummary> {
        match self.aggregate(entity_id, date, results) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(entity = entity_id, %date, "skipping daily summary: {}", e);
                None
            }
        }
    }
}

/// Whether `candidate` replaces `kept` for the same text id
fn supersedes(candidate: &ConsensusResult, kept: &ConsensusResult) -> bool {
    candidate
        .published_at
        .cmp(&kept.published_at)
        .then_with(|| candidate.avg_polarity.total_cmp(&kept.avg_polarity))
        .then_with(|| candidate.consensus_label.cmp(&kept.consensus_label))
        .is_gt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::consensus::VoteTally;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn result(text_id: &str, entity: &str, when: DateTime<Utc>, polarity: f64, label: SentimentLabel) -> ConsensusResult {
        ConsensusResult {
            text_id: text_id.to_string(),
            entity_id: entity.to_string(),
            published_at: when,
            avg_polarity: polarity,
            consensus_label: label,
            agreement_ratio: 1.0,
            engine_count: 1,
            votes: VoteTally::from_labels([label]),
            mean_confidence: None,
        }
    }

    fn mixed_day() -> Vec<ConsensusResult> {
        vec![
            result("a", "x", at(1, 9), 0.3, SentimentLabel::Positive),
            result("b", "x", at(1, 12), 0.2, SentimentLabel::Positive),
            result("c", "x", at(1, 23), -0.4, SentimentLabel::Negative),
        ]
    }

    #[test]
    fn test_mixed_day_is_neutral() {
        let summaries = DailyAggregator::new()
            .summarize(&mixed_day(), date(1), Some("x"))
            .unwrap();

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert!((summary.avg_polarity - 0.1 / 3.0).abs() < 1e-12);
        assert_eq!(summary.label, SentimentLabel::Neutral);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 0);
        assert_eq!(summary.item_count, 3);
    }

    #[test]
    fn test_idempotent_and_order_independent() {
        let aggregator = DailyAggregator::new();
        let results = mixed_day();
        let first = aggregator.summarize(&results, date(1), None).unwrap();
        let second = aggregator.summarize(&results, date(1), None).unwrap();
        assert_eq!(first, second);

        let mut shuffled = results.clone();
        shuffled.reverse();
        let third = aggregator.summarize(&shuffled, date(1), None).unwrap();
        assert_eq!(first[0].avg_polarity.to_bits(), third[0].avg_polarity.to_bits());
        assert_eq!(first, third);
    }

    #[test]
    fn test_gap_produces_no_summary() {
        let aggregator = DailyAggregator::new();
        let results = mixed_day();
        assert!(aggregator.summarize(&results, date(2), Some("x")).unwrap().is_empty());
        assert!(aggregator.summarize(&results, date(1), Some("y")).unwrap().is_empty());
        assert!(matches!(
            aggregator.aggregate("x", date(2), &[]),
            Err(Error::AggregationGap { .. })
        ));
    }

    #[test]
    fn test_groups_by_entity_and_utc_day() {
        let mut results = mixed_day();
        results.push(result("d", "w", at(1, 10), -0.6, SentimentLabel::Negative));
        results.push(result("e", "x", at(2, 0), 0.9, SentimentLabel::Positive));

        let summaries = DailyAggregator::new().summarize(&results, date(1), None).unwrap();
        let keys: Vec<_> = summaries.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("w", date(1)), ("x", date(1))]);
        assert_eq!(summaries[0].label, SentimentLabel::Negative);
        assert_eq!(summaries[1].item_count, 3);
    }

    #[test]
    fn test_duplicate_text_counted_once() {
        let mut results = mixed_day();
        results.push(result("a", "x", at(1, 9), 0.3, SentimentLabel::Positive));

        let summaries = DailyAggregator::new().summarize(&results, date(1), None).unwrap();
        assert_eq!(summaries[0].item_count, 3);
        assert_eq!(summaries[0].positive_count, 2);
    }

    #[test]
    fn test_conflicting_duplicates_resolved_independent_of_order() {
        let older = result("a", "x", at(1, 8), -0.5, SentimentLabel::Negative);
        let newer = result("a", "x", at(1, 9), 0.5, SentimentLabel::Positive);
        let rival = result("a", "x", at(1, 9), 0.2, SentimentLabel::Positive);
        let other = result("b", "x", at(1, 10), 0.1, SentimentLabel::Neutral);

        let aggregator = DailyAggregator::new();
        let forward = vec![older.clone(), newer.clone(), rival.clone(), other.clone()];
        let backward = vec![other, rival, newer, older];
        let first = aggregator.summarize(&forward, date(1), None).unwrap();
        let second = aggregator.summarize(&backward, date(1), None).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].item_count, 2);
        assert_eq!(first[0].positive_count, 1);
        assert!((first[0].avg_polarity - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_group_does_not_drop_others() {
        let results = vec![
            result("a", "good", at(1, 9), 0.4, SentimentLabel::Positive),
            result("b", "bad", at(1, 10), 1.5, SentimentLabel::Positive),
        ];
        let aggregator = DailyAggregator::new();

        let summaries = aggregator.summarize(&results, date(1), None).unwrap();
        let keys: Vec<_> = summaries.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("good", date(1))]);

        let all = aggregator.summarize_all(&results).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].entity_id, "good");

        assert!(aggregator.summarize(&results, date(1), Some("bad")).unwrap().is_empty());
        let refs: Vec<&ConsensusResult> = results[1..].iter().collect();
        assert!(matches!(
            aggregator.aggregate("bad", date(1), &refs),
            Err(Error::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_aggregate_rejects_foreign_results() {
        let results = mixed_day();
        let refs: Vec<&ConsensusResult> = results.iter().collect();
        assert!(matches!(
            DailyAggregator::new().aggregate("y", date(1), &refs),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_summarize_all() {
        let mut results = mixed_day();
        results.push(result("e", "x", at(2, 0), 0.9, SentimentLabel::Positive));
        results.push(result("f", "a", at(2, 5), -0.2, SentimentLabel::Negative));

        let summaries = DailyAggregator::new().summarize_all(&results).unwrap();
        let keys: Vec<_> = summaries.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![("x", date(1)), ("a", date(2)), ("x", date(2))]);
    }

    #[test]
    fn test_validate_counts() {
        let summary = DailySummary {
            entity_id: "x".into(),
            date: date(1),
            avg_polarity: 0.2,
            label: SentimentLabel::Positive,
            item_count: 4,
            positive_count: 2,
            negative_count: 1,
            neutral_count: 0,
        };
        assert!(matches!(summary.validate(), Err(Error::DataIntegrity(_))));

        let consistent = DailySummary { item_count: 3, ..summary };
        assert!(consistent.validate().is_ok());
    }
}
