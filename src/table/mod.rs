//! Core table and column types

pub mod bitmap;
pub mod column;
#[allow(clippy::module_inception)]
mod table;

pub use bitmap::Bitmap;
pub use column::{Column, DataType, Value};
pub use table::Table;
