//! Built-in column operations

pub mod ops;

pub use ops::{group_rows, ln_ratio, mean0, mean_rows, sum_rows};
