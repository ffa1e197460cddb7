//! # Reporting
//!
//! Rollups over daily summaries and text items for dashboards and the CLI.

use crate::data::{Entity, TextItem};
use crate::sentiment::DailySummary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sector used for entities without one
pub const UNKNOWN_SECTOR: &str = "unknown";

/// Sentiment over all summarized days of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRanking {
    pub entity_id: String,
    /// Mean of the daily average polarities
    pub mean_polarity: f64,
    /// Days with a summary
    pub days: usize,
    /// Items across all days
    pub item_count: usize,
}

/// Sentiment over all entities of one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSentiment {
    pub sector: String,
    /// Mean of the daily average polarities of the sector's entities
    pub mean_polarity: f64,
    /// Distinct entities with at least one summary
    pub entity_count: usize,
    /// Items across all entities and days
    pub item_count: usize,
}

/// Item count for one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

/// Entities ranked by mean daily polarity, most positive first.
///
/// Entities with fewer than `min_days` summarized days are left out. Equal means
/// are ordered by entity id.
pub fn top_entities(summaries: &[DailySummary], min_days: usize, limit: usize) -> Vec<EntityRanking> {
    let mut per_entity: BTreeMap<&str, Vec<&DailySummary>> = BTreeMap::new();
    for summary in summaries {
        per_entity.entry(summary.entity_id.as_str()).or_default().push(summary);
    }

    let mut rankings: Vec<EntityRanking> = per_entity
        .into_iter()
        .filter(|(_, days)| days.len() >= min_days)
        .map(|(entity_id, days)| EntityRanking {
            entity_id: entity_id.to_string(),
            mean_polarity: days.iter().map(|s| s.avg_polarity).sum::<f64>() / days.len() as f64,
            days: days.len(),
            item_count: days.iter().map(|s| s.item_count).sum(),
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.mean_polarity
            .total_cmp(&a.mean_polarity)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    rankings.truncate(limit);
    rankings
}

/// Mean daily polarity per sector, sorted by sector name.
///
/// Summaries of entities missing from `entities`, or without a sector, count
/// towards [`UNKNOWN_SECTOR`].
pub fn sector_sentiment(summaries: &[DailySummary], entities: &[Entity]) -> Vec<SectorSentiment> {
    let sectors: HashMap<&str, &str> = entities
        .iter()
        .filter_map(|e| e.sector.as_deref().map(|sector| (e.id.as_str(), sector)))
        .collect();

    struct Acc<'a> {
        polarity_sum: f64,
        days: usize,
        items: usize,
        entities: BTreeSet<&'a str>,
    }

    let mut per_sector: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for summary in summaries {
        let sector = sectors
            .get(summary.entity_id.as_str())
            .copied()
            .unwrap_or(UNKNOWN_SECTOR);
        let acc = per_sector.entry(sector).or_insert_with(|| Acc {
            polarity_sum: 0.0,
            days: 0,
            items: 0,
            entities: BTreeSet::new(),
        });
        acc.polarity_sum += summary.avg_polarity;
        acc.days += 1;
        acc.items += summary.item_count;
        acc.entities.insert(summary.entity_id.as_str());
    }

    per_sector
        .into_iter()
        .map(|(sector, acc)| SectorSentiment {
            sector: sector.to_string(),
            mean_polarity: acc.polarity_sum / acc.days as f64,
            entity_count: acc.entities.len(),
            item_count: acc.items,
        })
        .collect()
}

/// Item count per source, largest first; equal counts by source name
pub fn source_counts(items: &[TextItem]) -> Vec<SourceCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.source.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<SourceCount> = counts
        .into_iter()
        .map(|(source, count)| SourceCount {
            source: source.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps name order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
