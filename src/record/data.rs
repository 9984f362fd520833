//! DataRecord - the key-value input a rule is evaluated against

use crate::error::{Result, RuleError};
use crate::record::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from field name to value, read-only to the evaluator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: HashMap<String, Value>,
}

impl DataRecord {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: HashMap::with_capacity(capacity),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Parse a JSON object such as `{"age": 25, "region": "US"}`
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| RuleError::InvalidRecord(e.to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<serde_json::Value> for DataRecord {
    type Error = RuleError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut record = DataRecord::with_capacity(map.len());
                for (key, value) in map {
                    let value = match value {
                        serde_json::Value::Bool(b) => Value::Bool(b),
                        serde_json::Value::Number(n) => match n.as_f64() {
                            Some(f) => Value::Number(f),
                            None => {
                                return Err(RuleError::InvalidRecord(format!(
                                    "field '{}' is not representable as a number",
                                    key
                                )))
                            }
                        },
                        serde_json::Value::String(s) => Value::String(s),
                        other => {
                            return Err(RuleError::InvalidRecord(format!(
                                "field '{}' has unsupported value {}",
                                key, other
                            )))
                        }
                    };
                    record.fields.insert(key, value);
                }
                Ok(record)
            }
            other => Err(RuleError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for DataRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = DataRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl From<HashMap<String, Value>> for DataRecord {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}
