//! # Pipeline
//!
//! Batch entry points: score text items against tracked entities and roll the
//! results into daily summaries.
//!
//! Per-item problems never abort a batch. Every item ends up either as a
//! consensus result or as a skipped item with a reason, and engine failures are
//! reported alongside. Only a malformed invocation (empty entity list) fails the call.

use crate::data::{Entity, EntityMatcher, KeywordExtractor, TextItem, TextNormalizer};
use crate::error::Result;
use crate::sentiment::{
    ConsensusResolver, ConsensusResult, DailyAggregator, DailySummary, EngineFailure,
    EngineRegistry, EngineScore, ScoringContext, SentimentLabel, VoteTally,
};
use crate::utils::config::AnalysisSettings;
use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Why an item produced no consensus result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Title is blank
    MissingTitle,
    /// Published before the configured recency window
    Stale,
    /// Normalized title and body are empty
    EmptyText,
    /// Preset entity reference names no known entity
    UnknownEntity,
    /// No entity alias occurs in the text
    NoMatch,
    /// Every engine failed or abstained
    NoEngineScores,
    /// The resolver rejected the scores
    Unresolved,
}

impl SkipReason {
    /// Snake-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingTitle => "missing_title",
            SkipReason::Stale => "stale",
            SkipReason::EmptyText => "empty_text",
            SkipReason::UnknownEntity => "unknown_entity",
            SkipReason::NoMatch => "no_match",
            SkipReason::NoEngineScores => "no_engine_scores",
            SkipReason::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item that produced no consensus result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub text_id: String,
    pub reason: SkipReason,
}

/// An engine failure on one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEngineFailure {
    pub text_id: String,
    #[serde(flatten)]
    pub failure: EngineFailure,
}

/// Counts describing a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items submitted
    pub total: usize,
    /// Items with a consensus result
    pub scored: usize,
    /// Items skipped, for any reason
    pub skipped: usize,
    /// Skipped items per reason
    pub skipped_by_reason: BTreeMap<SkipReason, usize>,
    /// Engine failures and abstentions across all items
    pub engine_failures: usize,
}

/// Outcome of one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Consensus results in input order, keyed by (text_id, entity_id)
    pub results: Vec<ConsensusResult>,
    /// Items that produced no result, in input order
    pub skipped: Vec<SkippedItem>,
    /// Engine failures, in input then registration order
    pub engine_failures: Vec<ItemEngineFailure>,
}

impl BatchReport {
    /// Counts for logging and reporting
    pub fn summary(&self) -> BatchSummary {
        let mut skipped_by_reason = BTreeMap::new();
        for item in &self.skipped {
            *skipped_by_reason.entry(item.reason).or_insert(0) += 1;
        }
        BatchSummary {
            total: self.results.len() + self.skipped.len(),
            scored: self.results.len(),
            skipped: self.skipped.len(),
            skipped_by_reason,
            engine_failures: self.engine_failures.len(),
        }
    }

    /// Skip reason for an item, if it was skipped
    pub fn skip_reason(&self, text_id: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.text_id == text_id)
            .map(|s| s.reason)
    }
}

/// Engine scores for one free text, outside any batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// Normalized text that was scored
    pub text: String,
    pub keywords: Vec<String>,
    pub scores: Vec<EngineScore>,
    pub failures: Vec<EngineFailure>,
}

impl TextAnalysis {
    /// Unweighted mean polarity, if any engine scored
    pub fn avg_polarity(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.scores.iter().map(|s| s.polarity).sum::<f64>() / self.scores.len() as f64)
    }

    /// Majority label, if any engine scored
    pub fn consensus_label(&self) -> Option<SentimentLabel> {
        if self.scores.is_empty() {
            return None;
        }
        Some(VoteTally::from_labels(self.scores.iter().map(|s| s.label)).winner().0)
    }
}

enum Outcome {
    Scored(ConsensusResult),
    Skipped(SkipReason),
}

struct ItemOutcome {
    outcome: Outcome,
    failures: Vec<EngineFailure>,
}

impl ItemOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: Outcome::Skipped(reason),
            failures: Vec::new(),
        }
    }
}

/// Sentiment pipeline
///
/// Holds the engines and their shared context. Both are read-only during a run,
/// so one pipeline can serve many batches, including concurrent ones.
#[derive(Debug)]
pub struct SentimentPipeline {
    normalizer: TextNormalizer,
    keywords: KeywordExtractor,
    registry: EngineRegistry,
    ctx: ScoringContext,
    resolver: ConsensusResolver,
    aggregator: DailyAggregator,
    settings: AnalysisSettings,
}

impl Default for SentimentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentPipeline {
    /// Create a pipeline with the built-in engines and default settings
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            keywords: KeywordExtractor::new(),
            registry: EngineRegistry::with_defaults(),
            ctx: ScoringContext::new(),
            resolver: ConsensusResolver::new(),
            aggregator: DailyAggregator::new(),
            settings: AnalysisSettings::default(),
        }
    }

    /// Create a pipeline running the configured subset of built-in engines
    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self> {
        let registry = EngineRegistry::with_defaults().select(&settings.engines)?;
        Ok(Self {
            registry,
            settings: settings.clone(),
            ..Self::new()
        })
    }

    /// Replace the engine registry
    pub fn with_registry(mut self, registry: EngineRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the scoring context
    pub fn with_context(mut self, ctx: ScoringContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Engines in the order they run
    pub fn engine_ids(&self) -> Vec<&str> {
        self.registry.ids()
    }

    /// Analysis settings in effect
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Process a batch as of now
    pub fn run(&self, items: &[TextItem], entities: &[Entity]) -> Result<BatchReport> {
        self.run_at(items, entities, Utc::now())
    }

    /// Process a batch as of `as_of`.
    ///
    /// `as_of` is the reference for the recency window and the timestamp given to
    /// items that carry none. Results keep the input order in sequential and
    /// parallel mode alike.
    pub fn run_at(
        &self,
        items: &[TextItem],
        entities: &[Entity],
        as_of: DateTime<Utc>,
    ) -> Result<BatchReport> {
        let matcher = EntityMatcher::new(entities)?;
        info!(
            items = items.len(),
            entities = matcher.len(),
            engines = self.registry.len(),
            parallel = self.settings.parallel,
            "processing batch"
        );

        let outcomes: Vec<ItemOutcome> = if self.settings.parallel {
            items
                .par_iter()
                .map(|item| self.process(item, &matcher, as_of))
                .collect()
        } else {
            items
                .iter()
                .map(|item| self.process(item, &matcher, as_of))
                .collect()
        };

        let mut report = BatchReport::default();
        for (item, outcome) in items.iter().zip(outcomes) {
            report
                .engine_failures
                .extend(outcome.failures.into_iter().map(|failure| ItemEngineFailure {
                    text_id: item.id.clone(),
                    failure,
                }));
            match outcome.outcome {
                Outcome::Scored(result) => report.results.push(result),
                Outcome::Skipped(reason) => report.skipped.push(SkippedItem {
                    text_id: item.id.clone(),
                    reason,
                }),
            }
        }

        let summary = report.summary();
        info!(
            scored = summary.scored,
            skipped = summary.skipped,
            engine_failures = summary.engine_failures,
            "batch complete"
        );
        Ok(report)
    }

    fn process(&self, item: &TextItem, matcher: &EntityMatcher<'_>, as_of: DateTime<Utc>) -> ItemOutcome {
        let outcome = self.process_item(item, matcher, as_of);
        if let Outcome::Skipped(reason) = &outcome.outcome {
            debug!(text_id = %item.id, %reason, "skipped item");
        }
        outcome
    }

    fn process_item(
        &self,
        item: &TextItem,
        matcher: &EntityMatcher<'_>,
        as_of: DateTime<Utc>,
    ) -> ItemOutcome {
        if item.title.trim().is_empty() {
            return ItemOutcome::skipped(SkipReason::MissingTitle);
        }
        if let Some(days) = self.settings.max_age_days {
            if !item.is_recent(as_of, days) {
                return ItemOutcome::skipped(SkipReason::Stale);
            }
        }

        let title = self.normalizer.normalize(&item.title);
        let body = self.normalizer.normalize_opt(item.body.as_deref());
        let text = match (title.is_empty(), body.is_empty()) {
            (true, true) => return ItemOutcome::skipped(SkipReason::EmptyText),
            (false, true) => title.clone(),
            (true, false) => body.clone(),
            (false, false) => format!("{} {}", title, body),
        };

        let entity = match &item.entity_ref {
            Some(entity_id) => match matcher.by_id(entity_id) {
                Some(entity) => entity,
                None => return ItemOutcome::skipped(SkipReason::UnknownEntity),
            },
            None => {
                let body = (!body.is_empty()).then_some(body.as_str());
                match matcher.match_text(&title, body) {
                    Some(entity) => entity,
                    None => return ItemOutcome::skipped(SkipReason::NoMatch),
                }
            }
        };

        let keywords = self.keywords.extract(&text, self.settings.max_keywords);
        let run = self.registry.score_all(&text, &self.ctx, &keywords);
        if !run.has_scores() {
            return ItemOutcome {
                outcome: Outcome::Skipped(SkipReason::NoEngineScores),
                failures: run.failures,
            };
        }

        let published_at = item.published_at.unwrap_or(as_of);
        let outcome = match self
            .resolver
            .resolve(&item.id, &entity.id, published_at, &run.scores)
        {
            Ok(result) => Outcome::Scored(result),
            Err(e) => {
                warn!(text_id = %item.id, "consensus failed: {}", e);
                Outcome::Skipped(SkipReason::Unresolved)
            }
        };

        ItemOutcome {
            outcome,
            failures: run.failures,
        }
    }

    /// Daily summaries for `date`, optionally for one entity only
    pub fn summarize(
        &self,
        results: &[ConsensusResult],
        date: NaiveDate,
        entity_id: Option<&str>,
    ) -> Result<Vec<DailySummary>> {
        self.aggregator.summarize(results, date, entity_id)
    }

    /// Daily summaries for every entity-day in `results`
    pub fn summarize_all(&self, results: &[ConsensusResult]) -> Result<Vec<DailySummary>> {
        self.aggregator.summarize_all(results)
    }

    /// Score one free text with every engine, without entity matching
    pub fn analyze_text(&self, raw: &str) -> TextAnalysis {
        let text = self.normalizer.normalize(raw);
        if text.is_empty() {
            return TextAnalysis {
                text,
                keywords: Vec::new(),
                scores: Vec::new(),
                failures: Vec::new(),
            };
        }

        let keywords = self.keywords.extract(&text, self.settings.max_keywords);
        let run = self.registry.score_all(&text, &self.ctx, &keywords);
        TextAnalysis {
            text,
            keywords,
            scores: run.scores,
            failures: run.failures,
        }
    }
}
