//! creatorstats: creator and video statistics pipeline
//!
//! Cleans two raw tables against declarative column rules, joins them,
//! computes per-creator and per-category statistics with TF-IDF keyword
//! ranking, and exports the results as date-partitioned Parquet.

pub mod builtins;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod keywords;
pub mod pipeline;
pub mod rules;
pub mod run;
pub mod stats;
pub mod table;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use keywords::{rank_per_item, rank_pooled};
pub use pipeline::{apply, CleanedTable};
pub use rules::{creator_rules, video_rules, ColumnRule, LogicalType, Predicate, RuleSet};
pub use run::run_pipeline;
pub use stats::{CreatorStatsRecord, KeywordLimits, PipelineSummary, StatsAggregator};
pub use table::{Bitmap, Column, DataType, Table, Value};

/// API Contract Self-Test
///
/// Fails to compile if types the binary and integration tests rely on are
/// removed from the crate root.
#[cfg(test)]
mod api_contract_self_test {
    use super::*;

    #[test]
    fn column_types_api_contract() {
        let _i = Column::Int64(vec![Some(1)]);
        let _f = Column::Float64(vec![None]);
        let _s = Column::Utf8(vec![Some("x".to_string())]);

        let _i_ctor = Column::new_i64(vec![1]);
        let _f_ctor = Column::new_f64(vec![1.0]);
        let _s_ctor = Column::new_utf8(vec!["x"]);
    }

    #[test]
    fn rule_presets_api_contract() {
        assert!(!creator_rules().is_empty());
        assert!(!video_rules().is_empty());
        let _rule = ColumnRule::new("views", LogicalType::Integer).fill(0i64);
    }

    #[test]
    fn pipeline_entry_points_api_contract() {
        let table = Table::from_pairs(vec![("views", Column::new_i64(vec![1]))]);
        let cleaned = apply("t", table, &RuleSet::default()).unwrap();
        let _agg = StatsAggregator::new(cleaned.into_inner(), Table::empty());
        let _run: fn(&PipelineConfig) -> Result<PipelineSummary> = run_pipeline;
    }
}
