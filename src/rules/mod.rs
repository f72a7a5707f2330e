//! Declarative column rules
//!
//! A rule set is plain data: an ordered list of [`ColumnRule`]s, each naming
//! a column, an optional fill default, advisory warnings and assertions.
//! Checks reference [`Predicate`]s by id, so rule sets round-trip through
//! JSON and can be injected per run.

pub mod predicate;
pub mod presets;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::{DataType, Value};

pub use predicate::Predicate;
pub use presets::{creator_rules, video_rules};

/// Logical column type, used for advisory checks and for reading raw files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Integer,
    String,
}

impl LogicalType {
    pub fn data_type(self) -> DataType {
        match self {
            LogicalType::Integer => DataType::Int64,
            LogicalType::String => DataType::Utf8,
        }
    }
}

/// Logged when the predicate holds; never blocks processing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub check: Predicate,
    pub message: String,
}

/// Logged at error level when the predicate holds; aborts the table load if
/// `fatal` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub check: Predicate,
    pub message: String,
    #[serde(default)]
    pub fatal: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: String,
    pub expected_type: LogicalType,
    /// Without a fill value, any missing cell fails the load.
    #[serde(default)]
    pub fill_value: Option<Value>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl ColumnRule {
    pub fn new(column: &str, expected_type: LogicalType) -> Self {
        Self {
            column: column.to_string(),
            expected_type,
            fill_value: None,
            warnings: Vec::new(),
            assertions: Vec::new(),
        }
    }

    pub fn fill(mut self, value: impl Into<Value>) -> Self {
        self.fill_value = Some(value.into());
        self
    }

    pub fn warn(mut self, check: Predicate, message: &str) -> Self {
        self.warnings.push(Warning {
            check,
            message: message.to_string(),
        });
        self
    }

    pub fn assert(mut self, check: Predicate, message: &str, fatal: bool) -> Self {
        self.assertions.push(Assertion {
            check,
            message: message.to_string(),
            fatal,
        });
        self
    }
}

/// Ordered rules for one table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    pub rules: Vec<ColumnRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ColumnRule>) -> Self {
        Self { rules }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Declared `(column, type)` pairs, in rule order.
    pub fn declared_types(&self) -> impl Iterator<Item = (&str, LogicalType)> {
        self.rules
            .iter()
            .map(|r| (r.column.as_str(), r.expected_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let rule = ColumnRule::new("views", LogicalType::Integer)
            .fill(0i64)
            .warn(Predicate::NotInteger, "Views is not an integer.")
            .assert(Predicate::Negative, "Views cannot be negative", true)
            .assert(Predicate::Duplicate, "second", false);
        assert_eq!(rule.fill_value, Some(Value::Int(0)));
        assert_eq!(rule.warnings.len(), 1);
        assert_eq!(rule.assertions[0].message, "Views cannot be negative");
        assert_eq!(rule.assertions[1].message, "second");
    }

    #[test]
    fn test_rule_set_json_round_trip() {
        let set = video_rules();
        let json = serde_json::to_string(&set).unwrap();
        let back = RuleSet::from_json(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_rule_set_from_handwritten_json() {
        let json = r#"[
            {"column": "views", "expected_type": "integer", "fill_value": 0,
             "assertions": [{"check": {"kind": "negative"}, "message": "neg", "fatal": true}]},
            {"column": "caption", "expected_type": "string", "fill_value": ""}
        ]"#;
        let set = RuleSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules[0].fill_value, Some(Value::Int(0)));
        assert_eq!(set.rules[1].fill_value, Some(Value::Str(String::new())));
        assert!(set.rules[0].assertions[0].fatal);
    }
}
