//! # Data Module
//!
//! Text items, reference entities, and the text-side processing that precedes scoring.

mod keywords;
mod matcher;
mod news;
mod preprocessing;

pub use keywords::{KeywordExtractor, DEFAULT_MAX_KEYWORDS, MIN_KEYWORD_CHARS};
pub use matcher::EntityMatcher;
pub use news::{Entity, TextItem};
pub use preprocessing::TextNormalizer;
