//! End-to-end runs: CSV files in, Parquet files out.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray, ListArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use creatorstats::io::export::STAGING_DIR;
use creatorstats::io::ParquetExporter;
use creatorstats::run::run_with;
use creatorstats::{PipelineConfig, PipelineError};

const CREATORS: &str = "\
creator_id,username,follower_count,avg_views,category,bio
1,alice,100,150,Gaming,plays games
2,bob,0,30,Cooking,
3,carol,,0,Music,sings
";

const VIDEOS: &str = "\
video_id,creator_id,views,likes,comments,shares,caption
101,1,100,5,3,2,viral viral trend
102,1,200,5,3,2,viral trend cool
103,2,30,,1,0,viral something else
104,999,5000,1,1,1,orphan clip
";

/// Helper to lay out one run's inputs in a temp dir
fn setup(creators: &str, videos: &str) -> (tempfile::TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().expect("tempdir");
    let creators_path = dir.path().join("creators.csv");
    let videos_path = dir.path().join("videos.csv");
    fs::write(&creators_path, creators).unwrap();
    fs::write(&videos_path, videos).unwrap();
    let config = PipelineConfig::new(creators_path, videos_path, dir.path().join("out"));
    (dir, config)
}

/// Whole file as one batch (an empty file has no row group to read)
fn read_parquet(path: &Path) -> RecordBatch {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder.build().unwrap().map(|b| b.unwrap()).collect();
    concat_batches(&schema, &batches).unwrap()
}

fn out(config: &PipelineConfig, rel: &str) -> PathBuf {
    config.output_dir.join(rel)
}

#[test]
fn test_full_run_summary() {
    let (_dir, config) = setup(CREATORS, VIDEOS);
    let exporter = ParquetExporter::new(&config.output_dir);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let summary = run_with(&config, &exporter, now).unwrap();

    assert_eq!(summary.unmatched_videos, 1);
    assert_eq!(summary.avg_views_total, 110.0);
    assert_eq!(summary.avg_views_by_creator[&1], 150.0);
    assert_eq!(summary.avg_views_by_creator[&2], 30.0);
    assert_eq!(summary.views_per_category["Gaming"], 300.0);
    assert_eq!(summary.views_per_category["Cooking"], 30.0);
    assert_eq!(summary.trending_keywords, vec!["viral", "trend", "cool"]);
    assert_eq!(summary.top_keywords_by_video["103"], vec!["viral"]);
    assert!(!summary.top_keywords_by_video.contains_key("104"));

    // carol has no videos, so no stats row
    let ids: Vec<i64> = summary.creator_stats.iter().map(|r| r.creator_id).collect();
    assert_eq!(ids, vec![1, 2]);
    let bob = &summary.creator_stats[1];
    assert_eq!(bob.virality_score, 0.0);
    // missing likes filled with 0: engagement 1 over 30 views
    assert!((bob.avg_engagement - 1.0 / 30.0).abs() < 1e-12);
}

#[test]
fn test_export_layout_and_schema() {
    let (_dir, config) = setup(CREATORS, VIDEOS);
    let exporter = ParquetExporter::new(&config.output_dir);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    run_with(&config, &exporter, now).unwrap();

    let stats = read_parquet(&out(&config, "creator_stats/2024-06-01.parquet"));
    assert_eq!(stats.num_rows(), 2);
    let schema = stats.schema();
    assert_eq!(
        schema.field_with_name("updated_at").unwrap().data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
    );
    assert!(!schema.field_with_name("top_keywords").unwrap().is_nullable());
    assert!(schema.field_with_name("username").unwrap().is_nullable());

    let avg_views = stats
        .column_by_name("avg_views")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert_eq!(avg_views.value(0), 150.0);

    let keywords = stats
        .column_by_name("top_keywords")
        .unwrap()
        .as_any()
        .downcast_ref::<ListArray>()
        .unwrap();
    let alice: Vec<_> = keywords
        .value(0)
        .as_string::<i32>()
        .iter()
        .flatten()
        .map(str::to_string)
        .collect();
    assert_eq!(alice, vec!["viral", "trend", "cool"]);

    let creators = read_parquet(&out(&config, "creators/2024-06-01.parquet"));
    assert_eq!(creators.num_rows(), 3);
    let followers = creators
        .column_by_name("follower_count")
        .unwrap()
        .as_primitive::<Int64Type>();
    assert_eq!(followers.value(2), 0);
    assert_eq!(followers.null_count(), 0);

    // every cleaned video is exported, the unmatched one included
    for (id, rows) in [(1, 2), (2, 1), (999, 1)] {
        let path = out(&config, &format!("videos/creator_id={id}/2024-06-01.parquet"));
        assert_eq!(read_parquet(&path).num_rows(), rows);
    }
}

#[test]
fn test_integrity_failure_exports_nothing() {
    let creators = CREATORS.replace("1,alice,100", "1,alice,-100");
    let (_dir, config) = setup(&creators, VIDEOS);
    let exporter = ParquetExporter::new(&config.output_dir);

    let err = run_with(&config, &exporter, Utc::now()).unwrap_err();
    assert!(err.is_integrity());
    assert_eq!(
        err.to_string(),
        "creators.csv - Follower count cannot be negative"
    );
    assert!(!config.output_dir.exists());
}

#[test]
fn test_failed_export_commits_nothing() {
    let (_dir, config) = setup(CREATORS, VIDEOS);
    fs::create_dir_all(&config.output_dir).unwrap();
    // a plain file where the videos dataset directory must go
    fs::write(out(&config, "videos"), b"").unwrap();
    let exporter = ParquetExporter::new(&config.output_dir);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    assert!(run_with(&config, &exporter, now).is_err());
    assert!(!out(&config, "creator_stats/2024-06-01.parquet").exists());
    assert!(!out(&config, "creators/2024-06-01.parquet").exists());
    assert!(!out(&config, STAGING_DIR).exists());
}

#[test]
fn test_unparseable_cell_names_the_file() {
    let videos = VIDEOS.replace("101,1,100", "101,1,lots");
    let (_dir, config) = setup(CREATORS, &videos);
    let exporter = ParquetExporter::new(&config.output_dir);

    let err = run_with(&config, &exporter, Utc::now()).unwrap_err();
    assert!(matches!(err, PipelineError::Read { .. }));
    assert!(err.to_string().contains("videos.csv"), "{err}");
    assert!(!config.output_dir.exists());
}

#[test]
fn test_missing_video_id_fails_load() {
    let videos = VIDEOS.replace("101,1,100", ",1,100");
    let (_dir, config) = setup(CREATORS, &videos);
    let exporter = ParquetExporter::new(&config.output_dir);

    match run_with(&config, &exporter, Utc::now()).unwrap_err() {
        PipelineError::Integrity { table, message } => {
            assert_eq!(table, "videos.csv");
            assert_eq!(message, "Column video_id contains null values.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_views_column_is_schema_error() {
    let videos = "video_id,creator_id,likes,comments,shares,caption\n101,1,1,1,1,hi there\n";
    let (_dir, config) = setup(CREATORS, videos);
    let exporter = ParquetExporter::new(&config.output_dir);

    let err = run_with(&config, &exporter, Utc::now()).unwrap_err();
    assert!(matches!(err, PipelineError::Schema { .. }));
}

#[test]
fn test_empty_inputs() {
    let (_dir, config) = setup(
        "creator_id,username,follower_count,avg_views,category,bio\n",
        "video_id,creator_id,views,likes,comments,shares,caption\n",
    );
    let exporter = ParquetExporter::new(&config.output_dir);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let summary = run_with(&config, &exporter, now).unwrap();
    assert!(summary.avg_views_total.is_nan());
    assert!(summary.creator_stats.is_empty());
    assert!(summary.trending_keywords.is_empty());

    let stats = read_parquet(&out(&config, "creator_stats/2024-06-01.parquet"));
    assert_eq!(stats.num_rows(), 0);
}
