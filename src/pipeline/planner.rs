//! Pipeline planner
//!
//! Lowers a [`RuleSet`] into [`PipeIR`] and splits the IR into
//! [`ExecutionPlan`] segments at every `Target` step.

use super::execution_plan::{ExecutionPlan, Segment};
use super::ir::{OpId, PipeIR, Step};
use crate::rules::RuleSet;

/// Pipeline planner
#[derive(Default)]
pub struct Planner {
    /// Current segment being built
    current_segment: Option<Segment>,

    /// Completed segments
    segments: Vec<Segment>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower rules into IR, one target step per rule.
    ///
    /// Per rule the order is: type check, missing-value handling, warnings,
    /// assertions.
    pub fn lower(rules: &RuleSet) -> PipeIR {
        let mut ir = PipeIR::new();
        for rule in &rules.rules {
            ir.push(Step::Target(rule.column.clone()));
            ir.push(Step::Op(OpId::ExpectType(rule.expected_type.data_type())));

            let na = match &rule.fill_value {
                Some(v) => OpId::FillMissing(v.clone()),
                None => OpId::RequireComplete,
            };
            ir.push(Step::Op(na));

            for w in &rule.warnings {
                ir.push(Step::Op(OpId::Warn {
                    check: w.check.clone(),
                    message: w.message.clone(),
                }));
            }
            for a in &rule.assertions {
                ir.push(Step::Op(OpId::Assert {
                    check: a.check.clone(),
                    message: a.message.clone(),
                    fatal: a.fatal,
                }));
            }
        }
        ir
    }

    /// Plan a pipeline IR into an execution plan
    pub fn plan(ir: &PipeIR) -> ExecutionPlan {
        let mut planner = Planner::new();

        for step in &ir.steps {
            planner.process_step(step);
        }

        // Flush any remaining segment
        planner.flush_segment();

        ExecutionPlan {
            segments: planner.segments,
        }
    }

    /// Lower and plan in one go.
    pub fn plan_rules(rules: &RuleSet) -> ExecutionPlan {
        Self::plan(&Self::lower(rules))
    }

    fn process_step(&mut self, step: &Step) {
        match step {
            Step::Target(column) => {
                // A new target always starts a new segment, even for a
                // column seen before: earlier columns are never revisited.
                self.flush_segment();
                self.current_segment = Some(Segment::new(column.clone()));
            }
            Step::Op(op) => {
                // Ops before any target have nothing to act on
                if let Some(seg) = &mut self.current_segment {
                    seg.push(op.clone());
                }
            }
        }
    }

    fn flush_segment(&mut self) {
        if let Some(seg) = self.current_segment.take() {
            if !seg.ops.is_empty() {
                self.segments.push(seg);
            }
        }
    }
}
