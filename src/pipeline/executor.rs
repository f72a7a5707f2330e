//! Pipeline executor
//!
//! Runs an [`ExecutionPlan`] against one table. Each segment consumes the
//! current table value and produces the next; predicates always observe the
//! table as left by the previous op.

use tracing::{debug, error, warn};

use super::execution_plan::{ExecutionPlan, Segment};
use super::ir::OpId;
use crate::error::{PipelineError, Result};
use crate::table::{Column, DataType, Table};

/// Execution statistics for one table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub segments_executed: usize,

    /// Missing cells replaced by fill values
    pub cells_filled: usize,

    /// Warnings whose predicate held
    pub warnings_raised: usize,

    /// Non-fatal assertions whose predicate held
    pub assertions_failed: usize,

    /// Columns whose physical type differed from the declared one
    pub type_mismatches: usize,
}

/// Output of a successful execution
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub table: Table,
    pub stats: ExecutionStats,
}

/// Pipeline executor
pub struct Executor {
    /// Table name, used in log lines and errors
    name: String,
    stats: ExecutionStats,
}

impl Executor {
    pub fn new(name: impl Into<String>) -> Self {
        Executor {
            name: name.into(),
            stats: ExecutionStats::default(),
        }
    }

    /// Execute a plan on input table
    ///
    /// The first fatal op aborts the run; no partial table is returned.
    pub fn execute(&mut self, plan: &ExecutionPlan, input: Table) -> Result<ExecutionResult> {
        let mut current = input;

        for segment in &plan.segments {
            current = self.execute_segment(segment, current)?;
            self.stats.segments_executed += 1;
        }

        Ok(ExecutionResult {
            table: current,
            stats: self.stats.clone(),
        })
    }

    fn execute_segment(&mut self, segment: &Segment, input: Table) -> Result<Table> {
        let column = segment.column.as_str();
        if !input.has_column(column) {
            return Err(PipelineError::schema(&self.name, column));
        }

        let mut current = input;
        for op in &segment.ops {
            current = self.execute_op(column, op, current)?;
        }
        Ok(current)
    }

    fn execute_op(&mut self, column: &str, op: &OpId, table: Table) -> Result<Table> {
        let name = self.name.as_str();
        match op {
            OpId::ExpectType(expected) => {
                let found = self.column_type(&table, column)?;
                if found != *expected {
                    self.stats.type_mismatches += 1;
                    warn!(
                        table = name,
                        column,
                        %expected,
                        %found,
                        "{} - Column {} declared {} but holds {}",
                        name,
                        column,
                        expected,
                        found
                    );
                }
                Ok(table)
            }

            OpId::FillMissing(value) => {
                let col = self.column(&table, column)?;
                let missing = col.null_count();
                if missing == 0 {
                    return Ok(table);
                }
                let filled = col.fill_nulls(value).ok_or_else(|| PipelineError::ColumnType {
                    table: name.to_string(),
                    column: column.to_string(),
                    expected: value.data_type(),
                    found: col.data_type(),
                })?;
                self.stats.cells_filled += missing;
                debug!(table = name, column, rows = missing, "filled missing cells");
                Ok(table.with_column(column, filled))
            }

            OpId::RequireComplete => {
                let missing = self.column(&table, column)?.null_count();
                if missing > 0 {
                    let message = format!("Column {} contains null values.", column);
                    error!(table = name, column, rows = missing, "{} - {}", name, message);
                    return Err(PipelineError::integrity(name, message));
                }
                Ok(table)
            }

            OpId::Warn { check, message } => {
                let flagged = check.flagged_rows(name, &table, column)?;
                if flagged.any() {
                    self.stats.warnings_raised += 1;
                    warn!(
                        table = name,
                        column,
                        rows = flagged.count_ones(),
                        "{} - {}",
                        name,
                        message
                    );
                }
                Ok(table)
            }

            OpId::Assert {
                check,
                message,
                fatal,
            } => {
                let flagged = check.flagged_rows(name, &table, column)?;
                if flagged.any() {
                    error!(
                        table = name,
                        column,
                        rows = flagged.count_ones(),
                        fatal = *fatal,
                        "{} - {}",
                        name,
                        message
                    );
                    if *fatal {
                        return Err(PipelineError::integrity(name, message.clone()));
                    }
                    self.stats.assertions_failed += 1;
                }
                Ok(table)
            }
        }
    }

    fn column<'t>(&self, table: &'t Table, column: &str) -> Result<&'t Column> {
        table
            .column(column)
            .ok_or_else(|| PipelineError::schema(&self.name, column))
    }

    fn column_type(&self, table: &Table, column: &str) -> Result<DataType> {
        Ok(self.column(table, column)?.data_type())
    }
}
