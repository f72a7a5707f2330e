//! Typed column with per-cell missing values
//!
//! Each cell is an `Option`: `None` is a missing entry. Columns never change
//! type in place; transformations produce new columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int64,
    Float64,
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
        };
        f.write_str(name)
    }
}

/// A single cell value, used for fill defaults and keyed lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int64,
            Value::Float(_) => DataType::Float64,
            Value::Str(_) => DataType::Utf8,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// A typed column of data; `None` marks a missing entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
}

impl Column {
    /// Int64 column without missing values
    pub fn new_i64(data: Vec<i64>) -> Self {
        Column::Int64(data.into_iter().map(Some).collect())
    }

    /// Float64 column without missing values
    pub fn new_f64(data: Vec<f64>) -> Self {
        Column::Float64(data.into_iter().map(Some).collect())
    }

    /// Utf8 column without missing values
    pub fn new_utf8<S: Into<String>>(data: Vec<S>) -> Self {
        Column::Utf8(data.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::Int64(_) => DataType::Int64,
            Column::Float64(_) => DataType::Float64,
            Column::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(data) => data.len(),
            Column::Float64(data) => data.len(),
            Column::Utf8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, i: usize) -> bool {
        match self {
            Column::Int64(data) => data[i].is_none(),
            Column::Float64(data) => data[i].is_none(),
            Column::Utf8(data) => data[i].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_null(i)).count()
    }

    /// Check if column contains any missing values
    pub fn has_nulls(&self) -> bool {
        (0..self.len()).any(|i| self.is_null(i))
    }

    pub fn as_i64(&self) -> Option<&[Option<i64>]> {
        match self {
            Column::Int64(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_utf8(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Utf8(data) => Some(data),
            _ => None,
        }
    }

    /// Numeric view of the cell at `i` (Int64 widened to f64).
    pub fn f64_at(&self, i: usize) -> Option<f64> {
        match self {
            Column::Int64(data) => data[i].map(|v| v as f64),
            Column::Float64(data) => data[i],
            Column::Utf8(_) => None,
        }
    }

    pub fn value_at(&self, i: usize) -> Option<Value> {
        match self {
            Column::Int64(data) => data[i].map(Value::Int),
            Column::Float64(data) => data[i].map(Value::Float),
            Column::Utf8(data) => data[i].clone().map(Value::Str),
        }
    }

    /// Column with every missing cell replaced by `fill`.
    ///
    /// Returns `None` when `fill` does not match the column type. An Int
    /// fill into a Float64 column is widened.
    pub fn fill_nulls(&self, fill: &Value) -> Option<Column> {
        match (self, fill) {
            (Column::Int64(data), Value::Int(v)) => {
                Some(Column::Int64(data.iter().map(|x| x.or(Some(*v))).collect()))
            }
            (Column::Float64(data), Value::Float(v)) => {
                Some(Column::Float64(data.iter().map(|x| x.or(Some(*v))).collect()))
            }
            (Column::Float64(data), Value::Int(v)) => Some(Column::Float64(
                data.iter().map(|x| x.or(Some(*v as f64))).collect(),
            )),
            (Column::Utf8(data), Value::Str(v)) => Some(Column::Utf8(
                data.iter()
                    .map(|x| x.clone().or_else(|| Some(v.clone())))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// New column holding the cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int64(data) => Column::Int64(indices.iter().map(|&i| data[i]).collect()),
            Column::Float64(data) => Column::Float64(indices.iter().map(|&i| data[i]).collect()),
            Column::Utf8(data) => {
                Column::Utf8(indices.iter().map(|&i| data[i].clone()).collect())
            }
        }
    }
}
