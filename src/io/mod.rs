//! File input and output
//!
//! - [`csv`]: raw CSV tables in
//! - [`arrow`]: table and stats record conversion to Arrow batches
//! - [`export`]: partitioned Parquet out

pub mod arrow;
pub mod csv;
pub mod export;

pub use self::arrow::{batch_to_table, creator_stats_to_batch, table_to_batch};
pub use self::csv::read_csv;
pub use self::export::{Exporter, ParquetExporter, Partition};
