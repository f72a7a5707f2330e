//! Partitioned export of result tables
//!
//! Layout under the output root:
//!
//! ```text
//! <dataset>/[<key>=<value>/...]<date>.parquet
//! ```

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Destination of one exported batch within a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    /// Hive-style `key=value` directories, outermost first
    pub keys: Vec<(String, String)>,
    /// Run date, `YYYY-MM-DD`
    pub date: String,
}

impl Partition {
    pub fn by_date(date: impl Into<String>) -> Self {
        Self {
            keys: Vec::new(),
            date: date.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.keys.push((key.into(), value.to_string()));
        self
    }

    /// Path of this partition relative to the dataset directory.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for (k, v) in &self.keys {
            path.push(format!("{k}={v}"));
        }
        path.push(format!("{}.{}", self.date, extension));
        path
    }
}

/// Writes result tables somewhere durable.
///
/// The written data must carry its own schema, field nullability included.
/// Exports become visible on [`commit`](Exporter::commit); an exporter that
/// writes in place keeps the default no-op `commit` and `abort`.
pub trait Exporter {
    /// Write `batch` as `dataset` at `partition`; returns its final location.
    fn export(&self, dataset: &str, partition: &Partition, batch: &RecordBatch)
        -> Result<PathBuf>;

    /// Publish every export since the last commit.
    fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Discard every export since the last commit.
    fn abort(&self) {}
}

/// Directory under the output root that holds uncommitted files.
pub const STAGING_DIR: &str = ".staging";

/// Snappy-compressed Parquet files under a root directory.
///
/// Files are written below `<root>/.staging` and moved into place on
/// commit, so a failed run leaves no partial dataset behind.
#[derive(Debug)]
pub struct ParquetExporter {
    root: PathBuf,
    /// Staged paths relative to the staging directory
    staged: RefCell<Vec<PathBuf>>,
}

impl ParquetExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: RefCell::new(Vec::new()),
        }
    }

    fn staging(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    fn clear_staging(&self) {
        self.staged.borrow_mut().clear();
        let staging = self.staging();
        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!(error = %e, path = %staging.display(), "could not remove staging directory");
            }
        }
    }
}

impl Exporter for ParquetExporter {
    fn export(
        &self,
        dataset: &str,
        partition: &Partition,
        batch: &RecordBatch,
    ) -> Result<PathBuf> {
        let relative = Path::new(dataset).join(partition.relative_path("parquet"));
        let path = self.staging().join(&relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let file = File::create(&path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        debug!(
            dataset,
            rows = batch.num_rows(),
            path = %path.display(),
            "staged"
        );
        self.staged.borrow_mut().push(relative.clone());
        Ok(self.root.join(relative))
    }

    /// Create every target directory first, then rename staged files into
    /// place. A directory that cannot be created fails the commit before
    /// any file is published.
    fn commit(&self) -> Result<()> {
        let staged = self.staged.borrow().clone();
        for relative in &staged {
            if let Some(dir) = self.root.join(relative).parent() {
                fs::create_dir_all(dir)?;
            }
        }
        for relative in &staged {
            let target = self.root.join(relative);
            fs::rename(self.staging().join(relative), &target)?;
            info!(path = %target.display(), "exported");
        }
        self.clear_staging();
        Ok(())
    }

    fn abort(&self) {
        let dropped = self.staged.borrow().len();
        self.clear_staging();
        if dropped > 0 {
            warn!(files = dropped, "discarded staged export");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::arrow::{batch_to_table, table_to_batch};
    use crate::table::{Column, Table};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    #[test]
    fn test_partition_path() {
        let p = Partition::by_date("2024-01-02").with_key("creator_id", 7);
        assert_eq!(
            p.relative_path("parquet"),
            PathBuf::from("creator_id=7/2024-01-02.parquet")
        );
    }

    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ParquetExporter::new(dir.path());
        let table = Table::from_pairs(vec![
            ("creator_id", Column::Int64(vec![Some(1), None])),
            ("username", Column::new_utf8(vec!["a", "b"])),
        ]);
        let batch = table_to_batch(&table).unwrap();

        let path = exporter
            .export("creators", &Partition::by_date("2024-01-02"), &batch)
            .unwrap();
        assert_eq!(path, dir.path().join("creators/2024-01-02.parquet"));
        assert!(!path.exists());
        exporter.commit().unwrap();
        assert!(!dir.path().join(STAGING_DIR).exists());

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batch_to_table(&batches[0]).unwrap(), table);
        assert!(batches[0].schema().field(0).is_nullable());
    }

    #[test]
    fn test_abort_discards_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ParquetExporter::new(dir.path());
        let table = Table::from_pairs(vec![("creator_id", Column::new_i64(vec![1]))]);
        let batch = table_to_batch(&table).unwrap();

        let path = exporter
            .export("creators", &Partition::by_date("2024-01-02"), &batch)
            .unwrap();
        exporter.abort();

        assert!(!path.exists());
        assert!(!dir.path().join(STAGING_DIR).exists());
        // nothing left to publish
        exporter.commit().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_blocked_target_publishes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // a plain file where a dataset directory must go
        fs::write(dir.path().join("videos"), b"").unwrap();
        let exporter = ParquetExporter::new(dir.path());
        let batch =
            table_to_batch(&Table::from_pairs(vec![("v", Column::new_i64(vec![1]))])).unwrap();
        let day = Partition::by_date("2024-01-02");

        let stats = exporter.export("creator_stats", &day, &batch).unwrap();
        exporter
            .export("videos", &day.clone().with_key("creator_id", 1), &batch)
            .unwrap();
        exporter.commit().unwrap_err();
        exporter.abort();

        assert!(!stats.exists());
        assert!(!dir.path().join(STAGING_DIR).exists());
    }
}
