//! Registered table predicates
//!
//! A predicate is a pure function over the current table state, addressed
//! through the column of the rule that references it. It reports the rows it
//! flags; the predicate "holds" when at least one row is flagged.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::table::{Bitmap, Column, Table};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Present numeric cells below zero.
    Negative,
    /// Present numeric cells outside `[min, max]` (either bound optional).
    OutOfRange {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Present cells that are not integers.
    NotInteger,
    /// Present cells that are not strings.
    NotString,
    /// Present string cells equal to "".
    EmptyString,
    /// Present cells whose value already appeared in an earlier row.
    Duplicate,
}

impl Predicate {
    /// Rows of `column` flagged by this predicate.
    ///
    /// An empty table flags nothing, so every predicate is false on it.
    pub fn flagged_rows(&self, table_name: &str, table: &Table, column: &str) -> Result<Bitmap> {
        let col = table
            .column(column)
            .ok_or_else(|| PipelineError::schema(table_name, column))?;
        let n = col.len();

        let mask = match self {
            Predicate::Negative => Bitmap::from_fn(n, |i| col.f64_at(i).is_some_and(|v| v < 0.0)),
            Predicate::OutOfRange { min, max } => Bitmap::from_fn(n, |i| {
                col.f64_at(i).is_some_and(|v| {
                    min.is_some_and(|lo| v < lo) || max.is_some_and(|hi| v > hi)
                })
            }),
            Predicate::NotInteger => match col {
                Column::Int64(_) => Bitmap::new_all_clear(n),
                Column::Float64(data) => {
                    Bitmap::from_fn(n, |i| data[i].is_some_and(|v| v.fract() != 0.0))
                }
                Column::Utf8(data) => Bitmap::from_fn(n, |i| data[i].is_some()),
            },
            Predicate::NotString => match col {
                Column::Utf8(_) => Bitmap::new_all_clear(n),
                other => Bitmap::from_fn(n, |i| !other.is_null(i)),
            },
            Predicate::EmptyString => match col {
                Column::Utf8(data) => {
                    Bitmap::from_fn(n, |i| data[i].as_deref().is_some_and(str::is_empty))
                }
                _ => Bitmap::new_all_clear(n),
            },
            Predicate::Duplicate => {
                let mut seen = HashSet::new();
                Bitmap::from_fn(n, |i| match col.value_at(i) {
                    // Value holds f64, so key on the rendered cell
                    Some(v) => !seen.insert(v.to_string()),
                    None => false,
                })
            }
        };
        Ok(mask)
    }

    /// True if any row of `column` is flagged.
    pub fn holds(&self, table_name: &str, table: &Table, column: &str) -> Result<bool> {
        Ok(self.flagged_rows(table_name, table, column)?.any())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Negative => f.write_str("negative"),
            Predicate::OutOfRange { min, max } => write!(f, "out_of_range({:?}, {:?})", min, max),
            Predicate::NotInteger => f.write_str("not_integer"),
            Predicate::NotString => f.write_str("not_string"),
            Predicate::EmptyString => f.write_str("empty_string"),
            Predicate::Duplicate => f.write_str("duplicate"),
        }
    }
}
