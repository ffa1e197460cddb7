//! # Scoring Engines
//!
//! The engine contract, the per-engine score record, and the ordered registry that
//! runs every engine over a text while isolating individual failures.

use super::context::ScoringContext;
use super::engines::{LexiconEngine, PhraseEngine, ValenceEngine};
use super::label::SentimentLabel;
use crate::error::{EngineError, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Raw output of one engine before it is labelled and validated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    /// Signed polarity, expected in [-1, 1]
    pub polarity: f64,
    /// Engine-specific certainty, expected in [0, 1]
    pub confidence: Option<f64>,
    /// Engine-specific diagnostics
    pub extra: BTreeMap<String, f64>,
}

impl EngineOutput {
    /// Create output with a polarity only
    pub fn new(polarity: f64) -> Self {
        Self {
            polarity,
            ..Default::default()
        }
    }

    /// Set confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attach a diagnostic value
    pub fn with_extra(mut self, key: &str, value: f64) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// A sentiment scorer over normalized text
pub trait SentimentEngine: Send + Sync {
    /// Stable engine identifier, unique within a registry
    fn id(&self) -> &str;

    /// Score normalized text using the shared read-only context
    fn score(
        &self,
        text: &str,
        ctx: &ScoringContext,
    ) -> std::result::Result<EngineOutput, EngineError>;
}

/// Score produced by one engine for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineScore {
    /// Engine that produced the score
    pub engine_id: String,
    /// Signed polarity (-1 to 1)
    pub polarity: f64,
    /// Label derived from polarity with the shared threshold
    pub label: SentimentLabel,
    /// Engine-specific confidence (0 to 1)
    pub confidence: Option<f64>,
    /// Salient terms of the scored text
    pub keywords: Vec<String>,
    /// Engine-specific diagnostics
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl EngineScore {
    /// Build a score from a polarity, deriving the label
    pub fn new(engine_id: impl Into<String>, polarity: f64) -> Self {
        Self {
            engine_id: engine_id.into(),
            polarity,
            label: SentimentLabel::from_polarity(polarity),
            confidence: None,
            keywords: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// An engine that did not produce a score for a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// Engine that failed
    pub engine_id: String,
    /// Why it failed
    pub error: EngineError,
}

/// Outcome of running every registered engine over one text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineRun {
    /// Scores from engines that succeeded, in registration order
    pub scores: Vec<EngineScore>,
    /// Engines that failed or abstained
    pub failures: Vec<EngineFailure>,
}

impl EngineRun {
    /// Whether at least one engine produced a score
    pub fn has_scores(&self) -> bool {
        !self.scores.is_empty()
    }
}

/// Built-in engine ids in registration order
pub const DEFAULT_ENGINES: [&str; 3] = [LexiconEngine::ID, ValenceEngine::ID, PhraseEngine::ID];

/// Ordered set of named engines
///
/// Engines run in registration order, so score lists are deterministic.
#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Box<dyn SentimentEngine>>,
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.ids())
            .finish()
    }
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in engines
    pub fn with_defaults() -> Self {
        Self {
            engines: vec![
                Box::new(LexiconEngine::new()),
                Box::new(ValenceEngine::new()),
                Box::new(PhraseEngine::new()),
            ],
        }
    }

    /// Register an engine; ids must be unique
    pub fn register(&mut self, engine: Box<dyn SentimentEngine>) -> Result<()> {
        if self.engines.iter().any(|e| e.id() == engine.id()) {
            return Err(Error::DuplicateEngine(engine.id().to_string()));
        }
        self.engines.push(engine);
        Ok(())
    }

    /// Keep only the named engines, preserving registration order
    pub fn select<S: AsRef<str>>(self, ids: &[S]) -> Result<Self> {
        if ids.is_empty() {
            return Err(Error::InvalidInput("no scoring engines selected".to_string()));
        }
        for id in ids {
            let id: &str = id.as_ref();
            if !self.engines.iter().any(|e| e.id() == id) {
                return Err(Error::UnknownEngine(id.to_string()));
            }
        }

        let engines = self
            .engines
            .into_iter()
            .filter(|e| ids.iter().any(|id| id.as_ref() == e.id()))
            .collect();
        Ok(Self { engines })
    }

    /// Registered engine ids in order
    pub fn ids(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.id()).collect()
    }

    /// Number of registered engines
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Run every engine over `text`.
    ///
    /// A failing engine is logged and left out of the scores; the rest still run.
    pub fn score_all(&self, text: &str, ctx: &ScoringContext, keywords: &[String]) -> EngineRun {
        let mut run = EngineRun::default();

        for engine in &self.engines {
            let outcome = engine
                .score(text, ctx)
                .and_then(|output| validate_output(&output).map(|_| output));

            match outcome {
                Ok(output) => run.scores.push(EngineScore {
                    engine_id: engine.id().to_string(),
                    polarity: output.polarity,
                    label: SentimentLabel::from_polarity(output.polarity),
                    confidence: output.confidence,
                    keywords: keywords.to_vec(),
                    extra: output.extra,
                }),
                Err(error) => {
                    if error.is_abstention() {
                        debug!(engine = engine.id(), "engine abstained: {}", error);
                    } else {
                        warn!(engine = engine.id(), "engine failed: {}", error);
                    }
                    run.failures.push(EngineFailure {
                        engine_id: engine.id().to_string(),
                        error,
                    });
                }
            }
        }

        debug!(
            scored = run.scores.len(),
            failed = run.failures.len(),
            "completed sentiment scoring"
        );
        run
    }
}

fn validate_output(output: &EngineOutput) -> std::result::Result<(), EngineError> {
    if !output.polarity.is_finite() || !(-1.0..=1.0).contains(&output.polarity) {
        return Err(EngineError::UnusableOutput(format!(
            "polarity {} outside [-1, 1]",
            output.polarity
        )));
    }
    if let Some(confidence) = output.confidence {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(EngineError::UnusableOutput(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }
    }
    Ok(())
}
