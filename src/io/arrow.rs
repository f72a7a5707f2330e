//! Conversion between [`Table`] and Arrow record batches

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType as ArrowType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::stats::CreatorStatsRecord;
use crate::table::{Column, DataType, Table};

pub fn arrow_type(data_type: DataType) -> ArrowType {
    match data_type {
        DataType::Int64 => ArrowType::Int64,
        DataType::Float64 => ArrowType::Float64,
        DataType::Utf8 => ArrowType::Utf8,
    }
}

/// Arrow schema of `table`; every field is nullable.
pub fn table_schema(table: &Table) -> SchemaRef {
    let fields: Vec<Field> = table
        .names
        .iter()
        .zip(&table.columns)
        .map(|(name, col)| Field::new(name, arrow_type(col.data_type()), true))
        .collect();
    Arc::new(Schema::new(fields))
}

fn column_array(column: &Column) -> ArrayRef {
    match column {
        Column::Int64(data) => Arc::new(Int64Array::from(data.clone())),
        Column::Float64(data) => Arc::new(Float64Array::from(data.clone())),
        Column::Utf8(data) => Arc::new(StringArray::from(data.clone())),
    }
}

pub fn table_to_batch(table: &Table) -> Result<RecordBatch> {
    let arrays = table.columns.iter().map(column_array).collect();
    Ok(RecordBatch::try_new(table_schema(table), arrays)?)
}

/// Convert one Arrow array into a column.
///
/// Int64, Float64 and Utf8 map directly; other integer and float widths are
/// widened, anything else is rendered as strings.
pub fn array_to_column(array: &dyn Array) -> Result<Column> {
    let column = match array.data_type() {
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32 => {
            let cast = arrow::compute::cast(array, &ArrowType::Int64)?;
            let ints = downcast::<Int64Array>(cast.as_ref())?;
            Column::Int64(ints.iter().collect())
        }
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => {
            let cast = arrow::compute::cast(array, &ArrowType::Float64)?;
            let floats = downcast::<Float64Array>(cast.as_ref())?;
            Column::Float64(floats.iter().collect())
        }
        _ => {
            let cast = arrow::compute::cast(array, &ArrowType::Utf8)?;
            let strings = downcast::<StringArray>(cast.as_ref())?;
            Column::Utf8(strings.iter().map(|s| s.map(str::to_string)).collect())
        }
    };
    Ok(column)
}

fn downcast<T: Array + 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        arrow::error::ArrowError::CastError(format!(
            "unexpected array type {}",
            array.data_type()
        ))
        .into()
    })
}

pub fn batch_to_table(batch: &RecordBatch) -> Result<Table> {
    let schema = batch.schema();
    let mut names = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        names.push(field.name().clone());
        columns.push(array_to_column(array.as_ref())?);
    }
    Ok(Table::new(names, columns))
}

/// Arrow schema of the creator stats table.
pub fn creator_stats_schema() -> SchemaRef {
    let keyword = Field::new("item", ArrowType::Utf8, true);
    Arc::new(Schema::new(vec![
        Field::new("creator_id", ArrowType::Int64, false),
        Field::new("timestamp", ArrowType::Utf8, false),
        Field::new("username", ArrowType::Utf8, true),
        Field::new("follower_count", ArrowType::Int64, true),
        Field::new("avg_views", ArrowType::Float64, true),
        Field::new("top_category", ArrowType::Utf8, true),
        Field::new("avg_engagement", ArrowType::Float64, false),
        Field::new("virality_score", ArrowType::Float64, false),
        Field::new("top_keywords", ArrowType::List(Arc::new(keyword)), false),
        Field::new(
            "updated_at",
            ArrowType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
    ]))
}

pub fn creator_stats_to_batch(records: &[CreatorStatsRecord]) -> Result<RecordBatch> {
    let mut keywords = ListBuilder::new(StringBuilder::new());
    for r in records {
        for k in &r.top_keywords {
            keywords.values().append_value(k);
        }
        keywords.append(true);
    }

    // NaN means no present views; store it as missing
    let avg_views: Float64Array = records
        .iter()
        .map(|r| Some(r.avg_views).filter(|v| !v.is_nan()))
        .collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.creator_id))),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.timestamp.as_str()),
        )),
        Arc::new(StringArray::from_iter(
            records.iter().map(|r| r.username.as_deref()),
        )),
        Arc::new(Int64Array::from_iter(
            records.iter().map(|r| r.follower_count),
        )),
        Arc::new(avg_views),
        Arc::new(StringArray::from_iter(
            records.iter().map(|r| r.top_category.as_deref()),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.avg_engagement),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.virality_score),
        )),
        Arc::new(keywords.finish()),
        Arc::new(
            TimestampMicrosecondArray::from_iter_values(
                records.iter().map(|r| r.updated_at.timestamp_micros()),
            )
            .with_timezone("UTC"),
        ),
    ];
    Ok(RecordBatch::try_new(creator_stats_schema(), columns)?)
}
