//! Per-creator statistics rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builtins::{ln_ratio, mean_rows, sum_rows};
use crate::keywords::rank_pooled;
use crate::table::Column;

/// One row of the creator stats table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatorStatsRecord {
    pub creator_id: i64,
    /// Run date, `YYYY-MM-DD`
    pub timestamp: String,
    pub username: Option<String>,
    pub follower_count: Option<i64>,
    pub avg_views: f64,
    pub top_category: Option<String>,
    pub avg_engagement: f64,
    pub virality_score: f64,
    pub top_keywords: Vec<String>,
    /// Run instant
    pub updated_at: DateTime<Utc>,
}

impl CreatorStatsRecord {
    /// Numeric and keyword fields, without the run clock.
    pub fn metrics(&self) -> (i64, f64, f64, f64, &[String]) {
        (
            self.creator_id,
            self.avg_views,
            self.avg_engagement,
            self.virality_score,
            &self.top_keywords,
        )
    }

    pub fn log(&self) {
        info!(
            creator_id = self.creator_id,
            "Creator stats: {}|{}|{}|{}|{}|{}|{}|{}",
            self.creator_id,
            self.username.as_deref().unwrap_or(""),
            self.follower_count.map(|f| f.to_string()).unwrap_or_default(),
            self.avg_views,
            self.avg_engagement,
            self.virality_score,
            self.top_category.as_deref().unwrap_or(""),
            self.top_keywords.join(",")
        );
    }
}

/// Creator metadata taken from the creators table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreatorInfo {
    pub username: Option<String>,
    pub follower_count: Option<i64>,
    pub category: Option<String>,
}

/// Columns of the joined table one creator group is computed from.
pub struct GroupColumns<'a> {
    pub views: &'a Column,
    pub likes: &'a Column,
    pub comments: &'a Column,
    pub shares: &'a Column,
    pub captions: &'a [Option<String>],
}

/// Stats row for one creator group (`rows` index the joined table).
pub fn creator_record(
    creator_id: i64,
    info: &CreatorInfo,
    cols: &GroupColumns<'_>,
    rows: &[usize],
    keywords_top_n: usize,
    now: DateTime<Utc>,
) -> CreatorStatsRecord {
    let total_views = sum_rows(cols.views, rows);
    let total_engagement = sum_rows(cols.likes, rows)
        + sum_rows(cols.comments, rows)
        + sum_rows(cols.shares, rows);

    let avg_engagement = if total_views > 0.0 {
        total_engagement / total_views
    } else {
        0.0
    };
    let followers = info.follower_count.unwrap_or(0) as f64;
    let virality_score = ln_ratio(total_engagement, followers);

    let captions: Vec<&str> = rows
        .iter()
        .map(|&i| cols.captions[i].as_deref().unwrap_or(""))
        .collect();

    CreatorStatsRecord {
        creator_id,
        timestamp: now.format("%Y-%m-%d").to_string(),
        username: info.username.clone(),
        follower_count: info.follower_count,
        avg_views: mean_rows(cols.views, rows),
        top_category: info.category.clone(),
        avg_engagement,
        virality_score,
        top_keywords: rank_pooled(&captions, keywords_top_n),
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap()
    }

    fn record(followers: i64, likes: Vec<i64>) -> CreatorStatsRecord {
        let views = Column::new_i64(vec![100, 300]);
        let likes = Column::new_i64(likes);
        let zeros = Column::new_i64(vec![0, 0]);
        let captions = vec![Some("viral dance".to_string()), None];
        let cols = GroupColumns {
            views: &views,
            likes: &likes,
            comments: &zeros,
            shares: &zeros,
            captions: &captions,
        };
        let info = CreatorInfo {
            username: Some("alice".into()),
            follower_count: Some(followers),
            category: Some("Dance".into()),
        };
        creator_record(7, &info, &cols, &[0, 1], 3, at())
    }

    #[test]
    fn test_metrics() {
        let r = record(20, vec![10, 30]);
        assert_eq!(r.avg_views, 200.0);
        assert_eq!(r.avg_engagement, 0.1);
        assert!((r.virality_score - 2.0f64.ln()).abs() < 1e-12);
        assert_eq!(r.top_keywords, vec!["dance", "viral"]);
        assert_eq!(r.top_category.as_deref(), Some("Dance"));
    }

    #[test]
    fn test_zero_followers_zero_virality() {
        let r = record(0, vec![10, 30]);
        assert_eq!(r.virality_score, 0.0);
    }

    #[test]
    fn test_zero_engagement_clamped() {
        let r = record(50, vec![0, 0]);
        assert_eq!(r.virality_score, 0.0);
        assert_eq!(r.avg_engagement, 0.0);
    }

    #[test]
    fn test_run_clock_fields() {
        let r = record(1, vec![1, 1]);
        assert_eq!(r.timestamp, "2024-03-09");
        assert_eq!(r.updated_at, at());
    }
}
