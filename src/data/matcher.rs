//! # Entity Matcher
//!
//! Associates a text item with at most one tracked entity.
//!
//! Matching is a case-insensitive substring test of each entity's aliases against
//! title + body, walking entities in reference-list order. The first entity with a
//! matching alias wins and the search stops there, so an entity earlier in the list
//! shadows any later entity that shares a keyword.
//!
//! Aliases and text both go through [`TextNormalizer`], so an alias such as
//! `"AT&T"` is compared in the same stripped form as the text it is searched in.

use super::news::Entity;
use super::preprocessing::TextNormalizer;
use crate::error::{Error, Result};

/// Entity matcher over a fixed, ordered reference list
#[derive(Debug, Clone)]
pub struct EntityMatcher<'a> {
    entities: &'a [Entity],
    /// Normalized, lower-cased, non-blank aliases per entity, index-aligned with `entities`
    aliases: Vec<Vec<String>>,
    normalizer: TextNormalizer,
}

impl<'a> EntityMatcher<'a> {
    /// Create a matcher; an empty reference list is a malformed invocation
    pub fn new(entities: &'a [Entity]) -> Result<Self> {
        if entities.is_empty() {
            return Err(Error::InvalidInput("entity reference list is empty".to_string()));
        }

        let normalizer = TextNormalizer::new();
        let aliases = entities
            .iter()
            .map(|entity| {
                entity
                    .aliases
                    .iter()
                    .map(|alias| normalizer.normalize(alias).to_lowercase())
                    // A blank alias would match every text
                    .filter(|alias| !alias.is_empty())
                    .collect()
            })
            .collect();

        Ok(Self {
            entities,
            aliases,
            normalizer,
        })
    }

    /// Find the first entity whose aliases occur in the title or body.
    ///
    /// Raw and already normalized text give the same answer.
    pub fn match_text(&self, title: &str, body: Option<&str>) -> Option<&'a Entity> {
        let mut haystack = self.normalizer.normalize(title).to_lowercase();
        let body = self.normalizer.normalize_opt(body);
        if !body.is_empty() {
            haystack.push(' ');
            haystack.push_str(&body.to_lowercase());
        }

        if haystack.trim().is_empty() {
            return None;
        }

        self.entities
            .iter()
            .zip(&self.aliases)
            .find(|(_, aliases)| aliases.iter().any(|alias| haystack.contains(alias.as_str())))
            .map(|(entity, _)| entity)
    }

    /// Look up an entity by id, for items matched upstream
    pub fn by_id(&self, entity_id: &str) -> Option<&'a Entity> {
        self.entities.iter().find(|entity| entity.id == entity_id)
    }

    /// Number of entities in the reference list
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false; construction rejects empty lists
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
