//! # Sentiment Module
//!
//! Scoring engines, consensus across engines, and daily aggregation.

mod aggregator;
mod consensus;
mod context;
mod engine;
pub mod engines;
mod label;
pub mod lexicon;

pub use aggregator::{DailyAggregator, DailySummary};
pub use consensus::{ConsensusResolver, ConsensusResult, VoteTally};
pub use context::ScoringContext;
pub use engine::{
    EngineFailure, EngineOutput, EngineRegistry, EngineRun, EngineScore, SentimentEngine,
    DEFAULT_ENGINES,
};
pub use engines::{LexiconEngine, PhraseEngine, ValenceEngine};
pub use label::{SentimentLabel, NEUTRAL_BAND};
pub use lexicon::{FinancialLexicon, PhraseTable};
