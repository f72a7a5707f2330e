//! Raw CSV reading
//!
//! The schema is inferred from the file, then columns named by the rule set
//! are forced to their declared type so that, for example, numeric-looking
//! video ids stay strings. Empty fields read as missing.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use super::arrow::{arrow_type, batch_to_table};
use crate::error::Result;
use crate::rules::RuleSet;
use crate::table::Table;

const BATCH_SIZE: usize = 64 * 1024;

/// Read a headed CSV file into a table.
pub fn read_csv(path: &Path, rules: &RuleSet) -> Result<Table> {
    let mut file = File::open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, None)?;
    file.seek(SeekFrom::Start(0))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let declared = rules
                .declared_types()
                .find(|(column, _)| *column == f.name().as_str())
                .map(|(_, t)| arrow_type(t.data_type()));
            Field::new(
                f.name(),
                declared.unwrap_or_else(|| f.data_type().clone()),
                true,
            )
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .build(file)?;
    let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    debug!(
        path = %path.display(),
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "read csv"
    );
    batch_to_table(&batch)
}
