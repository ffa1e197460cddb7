//! # News Data Module
//!
//! Text items handed over by ingestion and the tracked entities they may concern.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A short news text awaiting analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Unique identifier
    pub id: String,
    /// Headline, always populated by ingestion
    pub title: String,
    /// Optional body text
    #[serde(default)]
    pub body: Option<String>,
    /// Publishing source (feed or domain name)
    #[serde(default = "default_source")]
    pub source: String,
    /// Publication timestamp, when the feed provides one
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Entity the item was already associated with upstream
    #[serde(default)]
    pub entity_ref: Option<String>,
}

fn default_source() -> String {
    "unknown".to_string()
}

impl TextItem {
    /// Create a new text item with only a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: None,
            source: default_source(),
            published_at: None,
            entity_ref: None,
        }
    }

    /// Set body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set publication timestamp
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Pre-assign the entity this item concerns
    pub fn with_entity_ref(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_ref = Some(entity_id.into());
        self
    }

    /// Whether the item is recent enough to analyze.
    ///
    /// Items without a publication date are always considered recent.
    pub fn is_recent(&self, now: DateTime<Utc>, max_age_days: i64) -> bool {
        match self.published_at {
            Some(published) => published >= now - Duration::days(max_age_days),
            None => true,
        }
    }
}

/// A tracked entity (company, issuer) with the aliases used to spot it in text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Exchange ticker
    pub ticker: String,
    /// Search terms, matched case-insensitively as substrings
    pub aliases: Vec<String>,
    /// Industry sector, used only for reporting rollups
    #[serde(default)]
    pub sector: Option<String>,
}

impl Entity {
    /// Create a new entity
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        aliases: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ticker: ticker.into(),
            aliases,
            sector: None,
        }
    }

    /// Set sector
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let item = TextItem::new("1", "Acme beats estimates")
            .with_body("Shares rose.")
            .with_source("reuters.com")
            .with_entity_ref("acme");

        assert_eq!(item.body.as_deref(), Some("Shares rose."));
        assert_eq!(item.source, "reuters.com");
        assert_eq!(item.entity_ref.as_deref(), Some("acme"));
    }

    #[test]
    fn test_recency() {
        let now = Utc::now();
        let fresh = TextItem::new("1", "a").with_published_at(now - Duration::days(2));
        let stale = TextItem::new("2", "b").with_published_at(now - Duration::days(9));
        let undated = TextItem::new("3", "c");

        assert!(fresh.is_recent(now, 7));
        assert!(!stale.is_recent(now, 7));
        assert!(undated.is_recent(now, 7));
    }

    #[test]
    fn test_deserialize_minimal_item() {
        let item: TextItem = serde_json::from_str(r#"{"id": "x", "title": "Hello"}"#).unwrap();
        assert_eq!(item.source, "unknown");
        assert!(item.body.is_none());
        assert!(item.published_at.is_none());
    }
}
