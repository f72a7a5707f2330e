//! Intermediate Representation for rule execution
//!
//! A rule set is lowered into a flat sequence of steps before planning:
//! `Target(column)` selects the column that following ops act on.

use crate::rules::Predicate;
use crate::table::{DataType, Value};

/// Operation identifier
#[derive(Clone, Debug, PartialEq)]
pub enum OpId {
    /// Advisory: log if the target column's type differs
    ExpectType(DataType),
    /// Substitute `value` into every missing cell of the target column
    FillMissing(Value),
    /// Fail the load if the target column has any missing cell
    RequireComplete,
    /// Log at warn level if `check` holds
    Warn { check: Predicate, message: String },
    /// Log at error level if `check` holds; abort if `fatal`
    Assert {
        check: Predicate,
        message: String,
        fatal: bool,
    },
}

/// A single step in the pipeline IR
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Select the column subsequent ops act on
    Target(String),

    /// Apply operation to the current target
    Op(OpId),
}

/// Pipeline intermediate representation
#[derive(Clone, Debug, Default)]
pub struct PipeIR {
    pub steps: Vec<Step>,
}

impl PipeIR {
    pub fn new() -> Self {
        PipeIR { steps: Vec::new() }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_ir_creation() {
        let mut ir = PipeIR::new();
        assert!(ir.is_empty());

        ir.push(Step::Target("views".to_string()));
        ir.push(Step::Op(OpId::FillMissing(Value::Int(0))));
        ir.push(Step::Op(OpId::Assert {
            check: Predicate::Negative,
            message: "Views cannot be negative".to_string(),
            fatal: true,
        }));

        assert_eq!(ir.len(), 3);
    }
}
