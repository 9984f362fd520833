//! Error types for the rule engine

use thiserror::Error;

/// Main error type for the rule engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("Syntax error at token {index}: {message}")]
    Syntax { index: usize, message: String },

    #[error("Evaluation error on field '{field}': {message}")]
    Eval { field: String, message: String },

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("At least two rules are required to combine, got {0}")]
    NotEnoughRules(usize),

    #[error("Rule string is empty")]
    EmptyRule,

    #[error("Rule not found: {0}")]
    RuleNotFound(u64),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl RuleError {
    pub(crate) fn syntax(index: usize, message: impl Into<String>) -> Self {
        RuleError::Syntax {
            index,
            message: message.into(),
        }
    }

    pub(crate) fn eval(field: &str, message: impl Into<String>) -> Self {
        RuleError::Eval {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// True for errors caused by the rule text itself
    pub fn is_syntax(&self) -> bool {
        matches!(self, RuleError::Syntax { .. })
    }
}

#[cfg(feature = "python")]
impl From<RuleError> for pyo3::PyErr {
    fn from(err: RuleError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyValueError};

        match err {
            RuleError::RuleNotFound(id) => PyKeyError::new_err(format!("Rule not found: {}", id)),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleError>;
