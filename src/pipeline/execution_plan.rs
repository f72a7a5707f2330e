//! Execution plan with per-column segments
//!
//! Each segment holds the ops of one rule, against one column, in
//! declaration order. Segments run strictly in plan order.

use super::ir::OpId;

/// Ops bound to a single column
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub column: String,
    pub ops: Vec<OpId>,
}

impl Segment {
    pub fn new(column: String) -> Self {
        Segment {
            column,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: OpId) {
        self.ops.push(op);
    }
}

/// Complete execution plan for one table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionPlan {
    /// Segments to execute in order
    pub segments: Vec<Segment>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
