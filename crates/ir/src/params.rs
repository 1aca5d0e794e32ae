//! Tunable parameter values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Performance parameters in effect for one optimization pass, keyed by name.
pub type PerfParams = BTreeMap<String, ParamValue>;

/// A single parameter value as written in a tuning specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    fn rank(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 0,
            ParamValue::Int(_) => 1,
            ParamValue::Float(_) => 2,
            ParamValue::Str(_) => 3,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParamValue {}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParamValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a.cmp(b),
            (ParamValue::Int(a), ParamValue::Int(b)) => a.cmp(b),
            (ParamValue::Float(a), ParamValue::Float(b)) => a.total_cmp(b),
            (ParamValue::Str(a), ParamValue::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(value) => write!(f, "{}", value),
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::Float(value) => write!(f, "{}", value),
            ParamValue::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[4, 2.5, true, "ijk"]"#).unwrap();
        assert_eq!(values[0], ParamValue::Int(4));
        assert_eq!(values[1], ParamValue::Float(2.5));
        assert_eq!(values[2], ParamValue::Bool(true));
        assert_eq!(values[3], ParamValue::from("ijk"));
    }

    #[test]
    fn test_ordering_within_and_across_kinds() {
        let mut values = vec![
            ParamValue::Int(8),
            ParamValue::from("a"),
            ParamValue::Int(1),
            ParamValue::Bool(false),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                ParamValue::Bool(false),
                ParamValue::Int(1),
                ParamValue::Int(8),
                ParamValue::from("a"),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::Int(16).to_string(), "16");
        assert_eq!(ParamValue::from("tile").to_string(), "tile");
    }
}
