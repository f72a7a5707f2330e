//! Key join of two tables
//!
//! Left rows are matched to the first right row with an equal key. Rows
//! without a match (or with a missing key) are dropped from the result and
//! counted.

use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::table::{Bitmap, Table};

/// Result of [`left_join_matched`].
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedTable {
    pub table: Table,
    /// Left rows dropped for lack of a matching right row
    pub unmatched: usize,
}

/// Left join `left` to `right` on `key`, keeping matched rows only.
///
/// Output columns are every left column, then every non-key right column.
/// A right column whose name is already taken gets `suffix` appended.
pub fn left_join_matched(
    left: &Table,
    left_name: &str,
    right: &Table,
    right_name: &str,
    key: &str,
    suffix: &str,
) -> Result<JoinedTable> {
    let left_key = left
        .column(key)
        .ok_or_else(|| PipelineError::schema(left_name, key))?;
    let right_key = right
        .column(key)
        .ok_or_else(|| PipelineError::schema(right_name, key))?;

    // First occurrence wins on duplicated right keys
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for i in 0..right_key.len() {
        if let Some(k) = right_key.value_at(i) {
            lookup.entry(k.to_string()).or_insert(i);
        }
    }

    let matched_right: Vec<Option<usize>> = (0..left_key.len())
        .map(|i| {
            left_key
                .value_at(i)
                .and_then(|k| lookup.get(&k.to_string()).copied())
        })
        .collect();

    let mask = Bitmap::from_fn(matched_right.len(), |i| matched_right[i].is_some());
    let right_rows: Vec<usize> = matched_right.iter().flatten().copied().collect();

    let Table {
        mut names,
        mut columns,
    } = left.filter(&mask);
    for (name, col) in right.names.iter().zip(&right.columns) {
        if name == key {
            continue;
        }
        let out_name = if names.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.clone()
        };
        names.push(out_name);
        columns.push(col.take(&right_rows));
    }

    Ok(JoinedTable {
        table: Table::new(names, columns),
        unmatched: left_key.len() - mask.count_ones(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn creators() -> Table {
        Table::from_pairs(vec![
            ("creator_id", Column::new_i64(vec![1, 2, 1])),
            ("username", Column::new_utf8(vec!["alice", "bob", "alice_dup"])),
            ("caption", Column::new_utf8(vec!["c1", "c2", "c3"])),
        ])
    }

    fn videos() -> Table {
        Table::from_pairs(vec![
            ("video_id", Column::new_utf8(vec!["101", "102", "103", "104"])),
            (
                "creator_id",
                Column::Int64(vec![Some(1), Some(999), Some(2), None]),
            ),
            ("caption", Column::new_utf8(vec!["a", "b", "c", "d"])),
        ])
    }

    #[test]
    fn test_unmatched_rows_dropped_and_counted() {
        let joined =
            left_join_matched(&videos(), "videos", &creators(), "creators", "creator_id", "_creator")
                .unwrap();
        assert_eq!(joined.unmatched, 2);
        assert_eq!(joined.table.row_count(), 2);
        assert_eq!(
            joined.table.column("video_id"),
            Some(&Column::new_utf8(vec!["101", "103"]))
        );
    }

    #[test]
    fn test_first_right_match_wins() {
        let joined =
            left_join_matched(&videos(), "videos", &creators(), "creators", "creator_id", "_creator")
                .unwrap();
        assert_eq!(
            joined.table.column("username"),
            Some(&Column::new_utf8(vec!["alice", "bob"]))
        );
    }

    #[test]
    fn test_colliding_names_get_suffix() {
        let joined =
            left_join_matched(&videos(), "videos", &creators(), "creators", "creator_id", "_creator")
                .unwrap();
        assert_eq!(
            joined.table.names,
            vec!["video_id", "creator_id", "caption", "username", "caption_creator"]
        );
        assert_eq!(
            joined.table.column("caption"),
            Some(&Column::new_utf8(vec!["a", "c"]))
        );
    }

    #[test]
    fn test_missing_key_is_schema_error() {
        let no_key = Table::from_pairs(vec![("x", Column::new_i64(vec![1]))]);
        let err = left_join_matched(&no_key, "videos", &creators(), "creators", "creator_id", "_c")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }
}
