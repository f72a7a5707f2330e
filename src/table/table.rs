//! Table structure (collection of named, typed columns)
//!
//! Tables are immutable per stage: every transformation returns a new table.

use super::{Bitmap, Column};

/// A table is a collection of named, typed columns of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub names: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Self {
        assert_eq!(names.len(), columns.len());
        debug_assert!(columns.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { names, columns }
    }

    /// Build from `(name, column)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: Vec<(S, Column)>) -> Self {
        let (names, columns) = pairs.into_iter().map(|(n, c)| (n.into(), c)).unzip();
        Self::new(names, columns)
    }

    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    /// New table with `name` replaced by `column` (appended if absent).
    pub fn with_column(&self, name: &str, column: Column) -> Table {
        let mut out = self.clone();
        match out.index_of(name) {
            Some(i) => out.columns[i] = column,
            None => {
                out.names.push(name.to_string());
                out.columns.push(column);
            }
        }
        out
    }

    /// New table with the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        }
    }

    /// New table with only the rows selected in `mask`.
    pub fn filter(&self, mask: &Bitmap) -> Table {
        debug_assert_eq!(mask.len(), self.row_count());
        self.take(&mask.ones())
    }
}
