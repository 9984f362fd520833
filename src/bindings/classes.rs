//! CompiledRule and RuleStore PyClasses
//!
//! Both hold their data in Rust memory; Python only keeps a handle.
//! Both are frozen, so they must be Send + Sync: the AST is shared through
//! `Arc` and the store guards its map with a lock.

use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

use super::{current_config, extract_record, parse_combine_type};
use crate::rule::{AstNode, Evaluator};
use crate::store::{RuleId, RuleStore};

// ============================================================================
// CompiledRule PyClass
// ============================================================================

/// Compiled rule handle; evaluate it any number of times
#[pyclass(name = "CompiledRule", frozen)]
pub struct PyCompiledRule {
    ast: Arc<AstNode>,
}

impl PyCompiledRule {
    pub fn new(ast: Arc<AstNode>) -> Self {
        Self { ast }
    }
}

#[pymethods]
impl PyCompiledRule {
    /// Evaluate against a dict of field values
    fn evaluate(&self, data: &Bound<'_, PyDict>) -> PyResult<bool> {
        let record = extract_record(data)?;
        Ok(Evaluator::new(&current_config()).evaluate(&self.ast, &record)?)
    }

    /// Canonical rule string for this tree
    #[getter]
    fn rule_string(&self) -> String {
        self.ast.to_string()
    }

    #[getter]
    fn depth(&self) -> usize {
        self.ast.depth()
    }

    fn __repr__(&self) -> String {
        format!("CompiledRule('{}')", self.ast)
    }

    fn __eq__(&self, other: PyRef<'_, Self>) -> bool {
        self.ast == other.ast
    }
}

// ============================================================================
// RuleStore PyClass
// ============================================================================

/// In-memory rule store with stable integer ids
#[pyclass(name = "RuleStore", frozen)]
pub struct PyRuleStore {
    inner: RuleStore,
}

#[pymethods]
impl PyRuleStore {
    /// Create an empty store using the current engine configuration
    #[new]
    fn new() -> Self {
        Self {
            inner: RuleStore::new(&current_config()),
        }
    }

    /// Store a rule string; returns its id
    fn create(&self, rule_string: &str) -> PyResult<RuleId> {
        Ok(self.inner.create(rule_string)?)
    }

    fn update(&self, rule_id: RuleId, rule_string: &str) -> PyResult<()> {
        Ok(self.inner.update(rule_id, rule_string)?)
    }

    fn delete(&self, rule_id: RuleId) -> PyResult<()> {
        self.inner.delete(rule_id)?;
        Ok(())
    }

    /// Rule string stored under `rule_id`, or None
    fn get(&self, rule_id: RuleId) -> Option<String> {
        self.inner.get(rule_id).map(|r| r.rule_string)
    }

    /// All `(id, rule_string)` pairs ordered by id
    fn list(&self) -> Vec<(RuleId, String)> {
        self.inner
            .list()
            .into_iter()
            .map(|r| (r.id, r.rule_string))
            .collect()
    }

    /// Store the combination of `rule_ids`; returns the new id
    fn combine(&self, rule_ids: Vec<RuleId>, combine_type: &str) -> PyResult<RuleId> {
        let operator = parse_combine_type(combine_type)?;
        Ok(self.inner.combine(&rule_ids, operator)?)
    }

    fn evaluate(&self, rule_id: RuleId, data: &Bound<'_, PyDict>) -> PyResult<bool> {
        let record = extract_record(data)?;
        Ok(self.inner.evaluate(rule_id, &record)?)
    }

    fn evaluate_combined(
        &self,
        rule_ids: Vec<RuleId>,
        combine_type: &str,
        data: &Bound<'_, PyDict>,
    ) -> PyResult<bool> {
        let operator = parse_combine_type(combine_type)?;
        let record = extract_record(data)?;
        Ok(self.inner.evaluate_combined(&rule_ids, operator, &record)?)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, rule_id: RuleId) -> bool {
        self.inner.contains(rule_id)
    }
}
