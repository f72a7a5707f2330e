//! Rule execution pipeline
//!
//! Cleaning a table goes through three stages:
//!
//! 1. **IR**: the [`RuleSet`] is lowered into a flat list of steps
//! 2. **Planner**: steps are split into one segment per rule
//! 3. **Executor**: segments run in declaration order, each producing a new
//!    table value
//!
//! ```text
//! [ColumnRule(views, fill 0, assert negative)]
//!     ↓
//! PipeIR: [Target(views), ExpectType(Int64), FillMissing(0), Assert(negative)]
//!     ↓
//! ExecutionPlan: [Segment(views, [ExpectType, FillMissing, Assert])]
//!     ↓
//! CleanedTable
//! ```

pub mod execution_plan;
pub mod executor;
pub mod ir;
pub mod planner;

use std::ops::Deref;

use tracing::info;

pub use execution_plan::{ExecutionPlan, Segment};
pub use executor::{ExecutionResult, ExecutionStats, Executor};
pub use ir::{OpId, PipeIR, Step};
pub use planner::Planner;

use crate::error::Result;
use crate::rules::RuleSet;
use crate::table::Table;

/// A table that passed every rule of its rule set.
#[derive(Clone, Debug)]
pub struct CleanedTable {
    pub name: String,
    pub table: Table,
    pub stats: ExecutionStats,
}

impl CleanedTable {
    pub fn into_inner(self) -> Table {
        self.table
    }
}

impl Deref for CleanedTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

/// Apply `rules` to `table`, in declaration order.
///
/// Fails with an integrity error on a missing value in a column without a
/// fill default, or on a fatal assertion. An empty table is valid.
pub fn apply(name: &str, table: Table, rules: &RuleSet) -> Result<CleanedTable> {
    let plan = Planner::plan_rules(rules);
    let result = Executor::new(name).execute(&plan, table)?;

    info!(
        table = name,
        rows = result.table.row_count(),
        filled = result.stats.cells_filled,
        warnings = result.stats.warnings_raised,
        "cleaned table"
    );

    Ok(CleanedTable {
        name: name.to_string(),
        table: result.table,
        stats: result.stats,
    })
}
