//! End-to-end pipeline run
//!
//! ```text
//! creators.csv ─ Ingestor ─┐
//!                          ├─ StatsAggregator ─ PipelineSummary
//! videos.csv ─── Ingestor ─┘         │
//!                                    └─ Exporter: creator_stats/, creators/, videos/
//! ```
//!
//! Any integrity, schema or I/O error aborts the run before the first file
//! is exported. Exports are published together on commit; a failed export
//! or commit discards them all.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::builtins::group_rows;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::ingest::Ingestor;
use crate::io::{creator_stats_to_batch, table_to_batch, Exporter, ParquetExporter, Partition};
use crate::stats::{PipelineSummary, StatsAggregator, CREATOR_ID};
use crate::table::Table;

pub const CREATOR_STATS_DATASET: &str = "creator_stats";
pub const CREATORS_DATASET: &str = "creators";
pub const VIDEOS_DATASET: &str = "videos";

/// Run the whole pipeline and write Parquet output under `config.output_dir`.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    let exporter = ParquetExporter::new(&config.output_dir);
    run_with(config, &exporter, Utc::now())
}

/// Run the whole pipeline at run instant `now`, exporting through `exporter`.
pub fn run_with<E: Exporter>(
    config: &PipelineConfig,
    exporter: &E,
    now: DateTime<Utc>,
) -> Result<PipelineSummary> {
    config.validate()?;

    let creators = Ingestor::new(&config.creators_path, &config.creator_rules).load()?;
    let videos = Ingestor::new(&config.videos_path, &config.video_rules).load()?;

    let aggregator = StatsAggregator::from_cleaned(creators, videos, config.keyword_limits());
    let summary = aggregator.generate_stats_at(now)?;

    info!(
        avg_views_total = summary.avg_views_total,
        creators = summary.creator_stats.len(),
        unmatched = summary.unmatched_videos,
        trending = %summary.trending_keywords.join(","),
        "stats generated"
    );

    let exported = export_all(
        exporter,
        &now.format("%Y-%m-%d").to_string(),
        &summary,
        aggregator.creators(),
        aggregator.videos(),
    )
    .and_then(|()| exporter.commit());
    if let Err(e) = exported {
        exporter.abort();
        return Err(e);
    }
    Ok(summary)
}

/// Export the three datasets of one run.
///
/// Videos are the cleaned table, unmatched rows included, one partition per
/// creator id.
pub fn export_all<E: Exporter>(
    exporter: &E,
    date: &str,
    summary: &PipelineSummary,
    creators: &Table,
    videos: &Table,
) -> Result<()> {
    let partition = Partition::by_date(date);
    exporter.export(
        CREATOR_STATS_DATASET,
        &partition,
        &creator_stats_to_batch(&summary.creator_stats)?,
    )?;
    exporter.export(CREATORS_DATASET, &partition, &table_to_batch(creators)?)?;

    let ids = videos
        .column(CREATOR_ID)
        .and_then(|c| c.as_i64())
        .ok_or_else(|| PipelineError::schema(VIDEOS_DATASET, CREATOR_ID))?;
    for (id, rows) in group_rows(ids.len(), |i| ids[i]) {
        let part = Partition::by_date(date).with_key(CREATOR_ID, id);
        exporter.export(VIDEOS_DATASET, &part, &table_to_batch(&videos.take(&rows))?)?;
    }
    Ok(())
}
