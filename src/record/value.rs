//! Dynamically typed field values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field value supplied in a data record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Truthiness used by bare field references
    #[inline]
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Numeric view of the value for relational comparisons.
    ///
    /// Strings only convert when `coerce_strings` is set and the trimmed text
    /// parses as a finite number. Booleans never convert.
    #[inline]
    pub fn as_number(&self, coerce_strings: bool) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) if coerce_strings => {
                s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// Equality against the literal text of a `key=value` operand
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Value::String(s) => s == literal,
            Value::Number(n) => literal
                .parse::<f64>()
                .map(|parsed| parsed == *n)
                .unwrap_or(false),
            Value::Bool(b) => {
                let expected = if *b { "true" } else { "false" };
                literal.eq_ignore_ascii_case(expected)
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
