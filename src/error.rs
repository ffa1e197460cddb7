//! Error types for the news sentiment library

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::config::ConfigError;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed invocation (empty entity list, bad arguments)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Consensus requested without any engine scores
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// No consensus results exist for an entity-day
    #[error("No consensus results for entity {entity_id} on {date}")]
    AggregationGap { entity_id: String, date: NaiveDate },

    /// A derived record violates its own invariants
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Two engines registered under the same id
    #[error("Engine already registered: {0}")]
    DuplicateEngine(String),

    /// Engine id not present in the registry
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single scoring engine on a single text
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EngineError {
    /// The engine found nothing it could score and abstains
    #[error("no scorable signal in text")]
    NoSignal,

    /// A resource the engine depends on is absent from the scoring context
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// The engine produced a value outside its contract
    #[error("unusable output: {0}")]
    UnusableOutput(String),

    /// Any other engine-internal failure
    #[error("engine failed: {0}")]
    Failed(String),
}

impl EngineError {
    /// Abstentions are expected outcomes rather than faults
    pub fn is_abstention(&self) -> bool {
        matches!(self, EngineError::NoSignal)
    }
}
