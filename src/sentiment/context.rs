//! Read-only scoring resources shared by every engine.

use super::lexicon::{FinancialLexicon, PhraseTable};

/// Resources loaded once before scoring and passed by reference into every engine call.
///
/// Nothing in here is mutated after construction, so a single context can be shared
/// across threads during parallel batch scoring.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    lexicon: FinancialLexicon,
    phrases: Option<PhraseTable>,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringContext {
    /// Create a context with the default lexicon and phrase table
    pub fn new() -> Self {
        Self {
            lexicon: FinancialLexicon::new(),
            phrases: Some(PhraseTable::new()),
        }
    }

    /// Replace the word lexicon
    pub fn with_lexicon(mut self, lexicon: FinancialLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Replace the phrase table
    pub fn with_phrases(mut self, phrases: PhraseTable) -> Self {
        self.phrases = Some(phrases);
        self
    }

    /// Drop the phrase table; engines depending on it will fail with a missing resource
    pub fn without_phrases(mut self) -> Self {
        self.phrases = None;
        self
    }

    /// Word lexicon
    pub fn lexicon(&self) -> &FinancialLexicon {
        &self.lexicon
    }

    /// Phrase table, if loaded
    pub fn phrases(&self) -> Option<&PhraseTable> {
        self.phrases.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_has_resources() {
        let ctx = ScoringContext::new();
        assert!(!ctx.lexicon().is_empty());
        assert!(ctx.phrases().is_some());
    }

    #[test]
    fn test_without_phrases() {
        let ctx = ScoringContext::new().without_phrases();
        assert!(ctx.phrases().is_none());
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoringContext>();
    }
}
