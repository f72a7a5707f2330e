//! Statistics over the cleaned creators and videos tables
//!
//! [`StatsAggregator`] owns both cleaned tables for one run. The join and
//! the creator stats table are computed on first use and cached for the
//! remainder of the run; every other aggregate is derived from the cached
//! join.

pub mod creator_stats;
pub mod join;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use tracing::{info, warn};

pub use creator_stats::{CreatorInfo, CreatorStatsRecord, GroupColumns};
pub use join::{left_join_matched, JoinedTable};

use crate::builtins::{group_rows, mean0, mean_rows, sum_rows};
use crate::error::{PipelineError, Result};
use crate::keywords::{rank_per_item, rank_pooled};
use crate::pipeline::CleanedTable;
use crate::table::{Column, DataType, Table};

/// Name used for the joined table in errors and logs.
pub const JOINED: &str = "joined";

/// Join key between videos and creators.
pub const CREATOR_ID: &str = "creator_id";

/// Suffix for creator columns whose name is already used by videos.
pub const CREATOR_SUFFIX: &str = "_creator";

/// Top-N settings for the keyword aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeywordLimits {
    pub trending: usize,
    pub per_video: usize,
    pub per_creator: usize,
}

impl Default for KeywordLimits {
    fn default() -> Self {
        Self {
            trending: 5,
            per_video: 3,
            per_creator: 3,
        }
    }
}

/// Every statistic of one run.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineSummary {
    pub avg_views_total: f64,
    pub avg_views_by_creator: BTreeMap<i64, f64>,
    pub views_per_category: BTreeMap<String, f64>,
    pub top_keywords_by_video: BTreeMap<String, Vec<String>>,
    pub trending_keywords: Vec<String>,
    pub creator_stats: Vec<CreatorStatsRecord>,
    pub unmatched_videos: usize,
}

pub struct StatsAggregator {
    creators: Table,
    videos: Table,
    /// Table names used in errors, the input file names for ingested tables
    creators_name: String,
    videos_name: String,
    limits: KeywordLimits,
    joined: OnceCell<JoinedTable>,
    creator_stats: OnceCell<Vec<CreatorStatsRecord>>,
}

impl StatsAggregator {
    pub fn new(creators: Table, videos: Table) -> Self {
        Self::with_limits(creators, videos, KeywordLimits::default())
    }

    pub fn with_limits(creators: Table, videos: Table, limits: KeywordLimits) -> Self {
        Self {
            creators,
            videos,
            creators_name: "creators".to_string(),
            videos_name: "videos".to_string(),
            limits,
            joined: OnceCell::new(),
            creator_stats: OnceCell::new(),
        }
    }

    /// Aggregate two cleaned tables, keeping their names for errors.
    pub fn from_cleaned(creators: CleanedTable, videos: CleanedTable, limits: KeywordLimits) -> Self {
        Self {
            creators_name: creators.name,
            videos_name: videos.name,
            ..Self::with_limits(creators.table, videos.table, limits)
        }
    }

    pub fn creators(&self) -> &Table {
        &self.creators
    }

    pub fn videos(&self) -> &Table {
        &self.videos
    }

    /// Videos joined to their creators; unmatched videos are dropped.
    pub fn join(&self) -> Result<&JoinedTable> {
        self.joined.get_or_try_init(|| {
            let joined = left_join_matched(
                &self.videos,
                &self.videos_name,
                &self.creators,
                &self.creators_name,
                CREATOR_ID,
                CREATOR_SUFFIX,
            )?;
            if joined.unmatched > 0 {
                warn!(
                    rows = joined.unmatched,
                    "Found {} videos with unmatched creator_id", joined.unmatched
                );
            }
            info!(rows = joined.table.row_count(), "joined videos to creators");
            Ok(joined)
        })
    }

    /// Mean views over the joined set; NaN when it is empty.
    pub fn average_views_total(&self) -> Result<f64> {
        let joined = &self.join()?.table;
        Ok(mean0(joined_column(joined, "views")?))
    }

    pub fn average_views_by_creator(&self) -> Result<BTreeMap<i64, f64>> {
        let joined = &self.join()?.table;
        let views = joined_column(joined, "views")?;
        let groups = self.creator_groups(joined)?;
        Ok(groups
            .into_iter()
            .map(|(id, rows)| (id, mean_rows(views, &rows)))
            .collect())
    }

    pub fn views_by_category(&self) -> Result<BTreeMap<String, f64>> {
        let joined = &self.join()?.table;
        let views = joined_column(joined, "views")?;
        let category = utf8_column(joined, "category")?;
        let groups = group_rows(category.len(), |i| category[i].clone());
        Ok(groups
            .into_iter()
            .map(|(cat, rows)| (cat, sum_rows(views, &rows)))
            .collect())
    }

    /// Top keywords over every caption of the joined set.
    pub fn trending_keywords(&self) -> Result<Vec<String>> {
        let joined = &self.join()?.table;
        let captions: Vec<&str> = utf8_column(joined, "caption")?
            .iter()
            .map(|c| c.as_deref().unwrap_or(""))
            .collect();
        Ok(rank_pooled(&captions, self.limits.trending))
    }

    /// Top keywords of each video's caption, keyed by video id.
    pub fn top_keywords_by_video(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let joined = &self.join()?.table;
        let ids = joined_column(joined, "video_id")?;
        let captions = utf8_column(joined, "caption")?;
        let texts: Vec<(String, &str)> = (0..ids.len())
            .map(|i| {
                let id = ids.value_at(i).map(|v| v.to_string()).unwrap_or_default();
                (id, captions[i].as_deref().unwrap_or(""))
            })
            .collect();
        Ok(rank_per_item(&texts, self.limits.per_video))
    }

    /// Creator stats table stamped with the current time; cached per run.
    pub fn build_creator_stats_table(&self) -> Result<&[CreatorStatsRecord]> {
        self.build_creator_stats_table_at(Utc::now())
    }

    /// Like [`build_creator_stats_table`](Self::build_creator_stats_table)
    /// with an explicit run instant. Only the first call computes; later
    /// calls return the cached table whatever `now` they pass.
    pub fn build_creator_stats_table_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<&[CreatorStatsRecord]> {
        self.creator_stats
            .get_or_try_init(|| self.creator_stats_at(now))
            .map(Vec::as_slice)
    }

    /// Creator stats table for run instant `now`, uncached.
    pub fn creator_stats_at(&self, now: DateTime<Utc>) -> Result<Vec<CreatorStatsRecord>> {
        let joined = &self.join()?.table;
        let cols = GroupColumns {
            views: joined_column(joined, "views")?,
            likes: joined_column(joined, "likes")?,
            comments: joined_column(joined, "comments")?,
            shares: joined_column(joined, "shares")?,
            captions: utf8_column(joined, "caption")?,
        };

        let infos = self.creator_infos()?;
        let mut records = Vec::new();
        for (id, rows) in self.creator_groups(joined)? {
            let info = infos.get(&id).cloned().unwrap_or_default();
            let record = creator_stats::creator_record(
                id,
                &info,
                &cols,
                &rows,
                self.limits.per_creator,
                now,
            );
            record.log();
            records.push(record);
        }
        Ok(records)
    }

    /// Compute every statistic of the run.
    pub fn generate_stats(&self) -> Result<PipelineSummary> {
        self.generate_stats_at(Utc::now())
    }

    pub fn generate_stats_at(&self, now: DateTime<Utc>) -> Result<PipelineSummary> {
        Ok(PipelineSummary {
            avg_views_total: self.average_views_total()?,
            avg_views_by_creator: self.average_views_by_creator()?,
            views_per_category: self.views_by_category()?,
            top_keywords_by_video: self.top_keywords_by_video()?,
            trending_keywords: self.trending_keywords()?,
            creator_stats: self.build_creator_stats_table_at(now)?.to_vec(),
            unmatched_videos: self.join()?.unmatched,
        })
    }

    fn creator_groups(&self, joined: &Table) -> Result<BTreeMap<i64, Vec<usize>>> {
        let ids = int_column(joined, JOINED, CREATOR_ID)?;
        Ok(group_rows(ids.len(), |i| ids[i]))
    }

    /// Metadata per creator id; the first row of a duplicated id wins.
    fn creator_infos(&self) -> Result<BTreeMap<i64, CreatorInfo>> {
        let creators = &self.creators;
        let name = self.creators_name.as_str();
        let ids = int_column(creators, name, CREATOR_ID)?;
        let usernames = optional_utf8(creators, name, "username")?;
        let followers = creators.column("follower_count");
        let categories = optional_utf8(creators, name, "category")?;

        let mut infos = BTreeMap::new();
        for (i, id) in ids.iter().enumerate() {
            let Some(id) = *id else { continue };
            infos.entry(id).or_insert_with(|| CreatorInfo {
                username: usernames.and_then(|c| c[i].clone()),
                follower_count: followers.and_then(|c| c.f64_at(i)).map(|f| f as i64),
                category: categories.and_then(|c| c[i].clone()),
            });
        }
        Ok(infos)
    }
}

fn joined_column<'t>(table: &'t Table, name: &str) -> Result<&'t Column> {
    table
        .column(name)
        .ok_or_else(|| PipelineError::schema(JOINED, name))
}

fn utf8_column<'t>(table: &'t Table, name: &str) -> Result<&'t [Option<String>]> {
    let col = joined_column(table, name)?;
    col.as_utf8().ok_or_else(|| PipelineError::ColumnType {
        table: JOINED.to_string(),
        column: name.to_string(),
        expected: DataType::Utf8,
        found: col.data_type(),
    })
}

fn int_column<'t>(table: &'t Table, table_name: &str, name: &str) -> Result<&'t [Option<i64>]> {
    let col = table
        .column(name)
        .ok_or_else(|| PipelineError::schema(table_name, name))?;
    col.as_i64().ok_or_else(|| PipelineError::ColumnType {
        table: table_name.to_string(),
        column: name.to_string(),
        expected: DataType::Int64,
        found: col.data_type(),
    })
}

/// A Utf8 column if present; present with another type is an error.
fn optional_utf8<'t>(
    table: &'t Table,
    table_name: &str,
    name: &str,
) -> Result<Option<&'t [Option<String>]>> {
    match table.column(name) {
        None => Ok(None),
        Some(col) => col.as_utf8().map(Some).ok_or_else(|| PipelineError::ColumnType {
            table: table_name.to_string(),
            column: name.to_string(),
            expected: DataType::Utf8,
            found: col.data_type(),
        }),
    }
}
