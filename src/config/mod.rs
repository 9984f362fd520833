//! Engine configuration
//!
//! Configuration can be built in code, parsed from JSON, or (with the
//! `python` feature) extracted from a Python dict.

use crate::error::{Result, RuleError};
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth of parenthesized groups
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options shared by the compiler and evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum nesting depth of `( ... )` groups; deeper input is a syntax error
    pub max_depth: usize,
    /// Whether string field values like `"18"` are coerced to numbers in comparisons
    pub coerce_numeric_strings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            coerce_numeric_strings: true,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a JSON object; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| RuleError::DeserializationError(format!("engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(RuleError::DeserializationError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "python")]
mod python {
    use super::EngineConfig;
    use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods};
    use pyo3::{Bound, PyResult};

    /// Deserialize engine config from a Python dict
    /// Expected format: {"max_depth": int, "coerce_numeric_strings": bool}
    pub fn deserialize_engine_config(config: &Bound<'_, PyDict>) -> PyResult<EngineConfig> {
        let defaults = EngineConfig::default();

        let max_depth: usize = match config.get_item("max_depth")? {
            Some(v) if !v.is_none() => v.extract()?,
            _ => defaults.max_depth,
        };
        let coerce_numeric_strings: bool = match config.get_item("coerce_numeric_strings")? {
            Some(v) if !v.is_none() => v.extract()?,
            _ => defaults.coerce_numeric_strings,
        };

        let config = EngineConfig {
            max_depth,
            coerce_numeric_strings,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "python")]
pub use python::deserialize_engine_config;
