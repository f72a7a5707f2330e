//! Column-level reductions
//!
//! Missing cells are skipped. Int64 columns are widened to f64.

use std::collections::BTreeMap;

use crate::table::Column;

// ============================================================================
// Aggregations
// ============================================================================

/// mean0: Mean (ignores missing cells)
///
/// Returns NaN if the column has no present numeric value.
#[inline]
pub fn mean0(x: &Column) -> f64 {
    let mut s = 0.0;
    let mut count = 0usize;
    for i in 0..x.len() {
        if let Some(v) = x.f64_at(i) {
            s += v;
            count += 1;
        }
    }

    if count == 0 {
        f64::NAN
    } else {
        s / (count as f64)
    }
}

/// Sum of `values` at `rows` (missing cells skipped).
#[inline]
pub fn sum_rows(values: &Column, rows: &[usize]) -> f64 {
    rows.iter().filter_map(|&i| values.f64_at(i)).sum()
}

/// Mean of `values` at `rows` (missing cells skipped); NaN when none present.
#[inline]
pub fn mean_rows(values: &Column, rows: &[usize]) -> f64 {
    let mut s = 0.0;
    let mut count = 0usize;
    for v in rows.iter().filter_map(|&i| values.f64_at(i)) {
        s += v;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        s / (count as f64)
    }
}

/// Row indices grouped by key, ordered by key.
///
/// Rows whose key is missing are dropped.
pub fn group_rows<K, F>(len: usize, mut key: F) -> BTreeMap<K, Vec<usize>>
where
    K: Ord,
    F: FnMut(usize) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for i in 0..len {
        if let Some(k) = key(i) {
            groups.entry(k).or_default().push(i);
        }
    }
    groups
}

/// ln(numerator / denominator), guarded.
///
/// Returns 0.0 when the denominator is not positive, and 0.0 when the ratio
/// is not positive (ln would be undefined or -inf).
#[inline]
pub fn ln_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio > 0.0 && ratio.is_finite() {
        ratio.ln()
    } else {
        0.0
    }
}
