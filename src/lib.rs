//! # News Sentiment
//!
//! Multi-engine sentiment scoring for short news texts about tracked entities,
//! with consensus resolution per text and daily rollups per entity.
//!
//! ## Modules
//!
//! - `data` - Text items, entities, normalization, entity matching, keywords
//! - `sentiment` - Scoring engines, consensus, daily aggregation
//! - `pipeline` - Batch entry points with per-item failure isolation
//! - `reporting` - Rollups over daily summaries
//! - `utils` - Configuration and logging
//!
//! ## Example Usage
//!
//! ```no_run
//! use news_sentiment::{Entity, SentimentPipeline, TextItem};
//!
//! fn main() -> news_sentiment::Result<()> {
//!     let entities = vec![Entity::new("acme", "Acme Corp", "ACME", vec!["acme".to_string()])];
//!     let items = vec![TextItem::new("1", "Acme Corp reported record profits and strong guidance")];
//!
//!     let pipeline = SentimentPipeline::new();
//!     let report = pipeline.run(&items, &entities)?;
//!
//!     for result in &report.results {
//!         println!("{} -> {} ({:.3})", result.text_id, result.consensus_label, result.avg_polarity);
//!     }
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod pipeline;
pub mod reporting;
pub mod sentiment;
pub mod utils;

// Re-exports for convenience
pub use data::{Entity, EntityMatcher, KeywordExtractor, TextItem, TextNormalizer};
pub use error::{EngineError, Error, Result};
pub use pipeline::{
    BatchReport, BatchSummary, ItemEngineFailure, SentimentPipeline, SkipReason, SkippedItem,
    TextAnalysis,
};
pub use reporting::{sector_sentiment, source_counts, top_entities};
pub use sentiment::{
    ConsensusResolver, ConsensusResult, DailyAggregator, DailySummary, EngineRegistry,
    EngineScore, ScoringContext, SentimentEngine, SentimentLabel,
};
pub use utils::{AnalysisSettings, AppConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Half-width of the neutral polarity band
    pub const NEUTRAL_BAND: f64 = crate::sentiment::NEUTRAL_BAND;

    /// Keywords attached to each engine score
    pub const MAX_KEYWORDS: usize = crate::data::DEFAULT_MAX_KEYWORDS;

    /// Recency window used by the CLI when none is configured (days)
    pub const RECENT_DAYS: i64 = 7;

    /// Minimum summarized days for an entity to be ranked
    pub const MIN_RANKED_DAYS: usize = 5;

    /// Entities shown in rankings
    pub const RANKING_LIMIT: usize = 10;
}
