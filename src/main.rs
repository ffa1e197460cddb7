//! CLI for news sentiment scoring
//!
//! Reads text items and entities from JSON files, scores them, and writes
//! consensus results and daily summaries back as JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use news_sentiment::utils::{init_logging, load_config, AppConfig};
use news_sentiment::{
    defaults, sector_sentiment, source_counts, top_entities, BatchReport, ConsensusResult,
    DailySummary, Entity, SentimentPipeline, TextItem,
};

#[derive(Parser)]
#[command(name = "news-sentiment")]
#[command(about = "Multi-engine news sentiment scoring", long_about = None)]
struct Cli {
    /// Configuration file (json, toml or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single text with every engine
    Score {
        /// Text to score
        #[arg(short, long)]
        text: String,
    },

    /// Match and score a batch of text items
    Analyze {
        /// JSON array of text items
        #[arg(short, long)]
        items: PathBuf,

        /// JSON array of tracked entities
        #[arg(short, long)]
        entities: PathBuf,

        /// Write the batch report here instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,

        /// Skip items older than the default recency window unless one is configured
        #[arg(long)]
        recent_only: bool,
    },

    /// Build daily summaries from consensus results
    Summarize {
        /// Batch report or JSON array of consensus results
        #[arg(short, long)]
        results: PathBuf,

        /// UTC date (YYYY-MM-DD); every date when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Restrict to one entity
        #[arg(long)]
        entity: Option<String>,

        /// Write summaries here instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank entities and sectors from daily summaries
    Report {
        /// JSON array of daily summaries
        #[arg(short, long)]
        summaries: PathBuf,

        /// Entities, for sector rollups
        #[arg(short, long)]
        entities: Option<PathBuf>,

        /// Text items, for per-source counts
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// Minimum summarized days for an entity to be ranked
        #[arg(long, default_value_t = defaults::MIN_RANKED_DAYS)]
        min_days: usize,

        /// Entities shown in the ranking
        #[arg(short, long, default_value_t = defaults::RANKING_LIMIT)]
        limit: usize,
    },
}

/// Consensus results, either bare or inside a batch report
#[derive(Deserialize)]
#[serde(untagged)]
enum ResultsFile {
    Report(BatchReport),
    Results(Vec<ConsensusResult>),
}

impl ResultsFile {
    fn into_results(self) -> Vec<ConsensusResult> {
        match self {
            ResultsFile::Report(report) => report.results,
            ResultsFile::Results(results) => results,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Score { text } => score_text(&config, &text)?,
        Commands::Analyze { items, entities, output, as_of, recent_only } => {
            analyze(&config, &items, &entities, output.as_deref(), as_of, recent_only)?;
        }
        Commands::Summarize { results, date, entity, output } => {
            summarize(&config, &results, date, entity.as_deref(), output.as_deref())?;
        }
        Commands::Report { summaries, entities, items, min_days, limit } => {
            report(&summaries, entities.as_deref(), items.as_deref(), min_days, limit)?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}

fn score_text(config: &AppConfig, text: &str) -> Result<()> {
    let pipeline = SentimentPipeline::from_settings(&config.analysis)?;
    let analysis = pipeline.analyze_text(text);

    println!("Text: {}\n", analysis.text);
    println!("{:<10} {:>10} {:>10} {:>12}", "Engine", "Polarity", "Label", "Confidence");
    println!("{}", "-".repeat(45));
    for score in &analysis.scores {
        let confidence = score
            .confidence
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>10.3} {:>10} {:>12}",
            score.engine_id, score.polarity, score.label, confidence
        );
    }
    for failure in &analysis.failures {
        println!("{:<10} {}", failure.engine_id, failure.error);
    }

    match (analysis.avg_polarity(), analysis.consensus_label()) {
        (Some(avg), Some(label)) => {
            println!("\nAverage polarity: {:.3}", avg);
            println!("Consensus: {}", label);
        }
        _ => println!("\nNo engine produced a score"),
    }
    if !analysis.keywords.is_empty() {
        println!("Keywords: {}", analysis.keywords.join(", "));
    }
    Ok(())
}

fn analyze(
    config: &AppConfig,
    items_path: &Path,
    entities_path: &Path,
    output: Option<&Path>,
    as_of: Option<DateTime<Utc>>,
    recent_only: bool,
) -> Result<()> {
    let items: Vec<TextItem> = read_json(items_path)?;
    let entities: Vec<Entity> = read_json(entities_path)?;

    let mut settings = config.analysis.clone();
    if recent_only && settings.max_age_days.is_none() {
        settings.max_age_days = Some(defaults::RECENT_DAYS);
    }
    let pipeline = SentimentPipeline::from_settings(&settings)?;
    let report = pipeline.run_at(&items, &entities, as_of.unwrap_or_else(Utc::now))?;

    if let Some(path) = output {
        write_json(path, &report)?;
    }

    let summary = report.summary();
    println!("Items:           {}", summary.total);
    println!("Scored:          {}", summary.scored);
    println!("Skipped:         {}", summary.skipped);
    for (reason, count) in &summary.skipped_by_reason {
        println!("  {:<16} {}", reason, count);
    }
    println!("Engine failures: {}", summary.engine_failures);

    if output.is_none() {
        println!("\n{:<20} {:<12} {:>10} {:>10} {:>10}", "Text", "Entity", "Polarity", "Label", "Agreement");
        println!("{}", "-".repeat(66));
        for result in &report.results {
            println!(
                "{:<20} {:<12} {:>10.3} {:>10} {:>9.0}%",
                result.text_id,
                result.entity_id,
                result.avg_polarity,
                result.consensus_label,
                result.agreement_ratio * 100.0
            );
        }
    }
    Ok(())
}

fn summarize(
    config: &AppConfig,
    results_path: &Path,
    date: Option<NaiveDate>,
    entity: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let results = read_json::<ResultsFile>(results_path)?.into_results();
    let pipeline = SentimentPipeline::from_settings(&config.analysis)?;

    let summaries: Vec<DailySummary> = match date {
        Some(date) => pipeline.summarize(&results, date, entity)?,
        None => pipeline
            .summarize_all(&results)?
            .into_iter()
            .filter(|s| entity.map_or(true, |id| s.entity_id == id))
            .collect(),
    };

    if let Some(path) = output {
        return write_json(path, &summaries);
    }

    println!(
        "{:<12} {:<12} {:>10} {:>10} {:>6} {:>6} {:>6} {:>6}",
        "Date", "Entity", "Polarity", "Label", "Items", "Pos", "Neg", "Neu"
    );
    println!("{}", "-".repeat(76));
    for s in &summaries {
        println!(
            "{:<12} {:<12} {:>10.3} {:>10} {:>6} {:>6} {:>6} {:>6}",
            s.date.to_string(),
            s.entity_id,
            s.avg_polarity,
            s.label,
            s.item_count,
            s.positive_count,
            s.negative_count,
            s.neutral_count
        );
    }
    if summaries.is_empty() {
        println!("No summaries for the requested period");
    }
    Ok(())
}

fn report(
    summaries_path: &Path,
    entities_path: Option<&Path>,
    items_path: Option<&Path>,
    min_days: usize,
    limit: usize,
) -> Result<()> {
    let summaries: Vec<DailySummary> = read_json(summaries_path)?;

    println!("Top entities (at least {} days)\n", min_days);
    println!("{:<12} {:>10} {:>6} {:>8}", "Entity", "Mean", "Days", "Items");
    println!("{}", "-".repeat(40));
    for ranking in top_entities(&summaries, min_days, limit) {
        println!(
            "{:<12} {:>10.3} {:>6} {:>8}",
            ranking.entity_id, ranking.mean_polarity, ranking.days, ranking.item_count
        );
    }

    if let Some(path) = entities_path {
        let entities: Vec<Entity> = read_json(path)?;
        println!("\nSector sentiment\n");
        println!("{:<20} {:>10} {:>9} {:>8}", "Sector", "Mean", "Entities", "Items");
        println!("{}", "-".repeat(50));
        for sector in sector_sentiment(&summaries, &entities) {
            println!(
                "{:<20} {:>10.3} {:>9} {:>8}",
                sector.sector, sector.mean_polarity, sector.entity_count, sector.item_count
            );
        }
    }

    if let Some(path) = items_path {
        let items: Vec<TextItem> = read_json(path)?;
        println!("\nItems by source\n");
        for count in source_counts(&items) {
            println!("{:<20} {:>8}", count.source, count.count);
        }
    }
    Ok(())
}
