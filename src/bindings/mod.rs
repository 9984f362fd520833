//! Python bindings
//!
//! The hosting layer for Python callers: module-level functions for one-off
//! compile/evaluate/combine calls plus the `CompiledRule` and `RuleStore`
//! classes.

mod classes;

use crate::config::{deserialize_engine_config, EngineConfig};
use crate::record::{DataRecord, Value};
use crate::rule::{cache, Compiler, Evaluator, LogOp};
use classes::{PyCompiledRule, PyRuleStore};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Cached Configuration
// ============================================================================

/// Global engine configuration, replaced by `init_config`
static CACHED_CONFIG: OnceCell<Arc<RwLock<EngineConfig>>> = OnceCell::new();

/// Current configuration, or the defaults if `init_config` was never called
pub(crate) fn current_config() -> EngineConfig {
    CACHED_CONFIG
        .get()
        .map(|config| *config.read())
        .unwrap_or_default()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a Python dict of str -> bool | int | float | str into a DataRecord
pub(crate) fn extract_record(dict: &Bound<'_, PyDict>) -> PyResult<DataRecord> {
    let mut record = DataRecord::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let field: String = key.extract()?;
        // bool first: Python bools are also ints
        let value = if value.is_instance_of::<PyBool>() {
            Value::Bool(value.extract()?)
        } else if let Ok(number) = value.extract::<f64>() {
            Value::Number(number)
        } else if let Ok(text) = value.extract::<String>() {
            Value::String(text)
        } else {
            return Err(pyo3::exceptions::PyTypeError::new_err(format!(
                "Unsupported value for field '{}': expected bool, int, float or str",
                field
            )));
        };
        record.insert(field, value);
    }
    Ok(record)
}

fn parse_combine_type(combine_type: &str) -> PyResult<LogOp> {
    Ok(combine_type.parse::<LogOp>()?)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Initialize the engine configuration
///
/// # Arguments
/// * `config` - Optional dict with `max_depth` and `coerce_numeric_strings`
#[pyfunction]
#[pyo3(signature = (config=None))]
fn init_config(config: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
    let parsed = match config {
        Some(dict) => deserialize_engine_config(dict)?,
        None => EngineConfig::default(),
    };

    if let Some(existing) = CACHED_CONFIG.get() {
        *existing.write() = parsed;
    } else {
        let _ = CACHED_CONFIG.set(Arc::new(RwLock::new(parsed)));
    }

    // drop trees compiled under the previous config
    cache::clear_cache();
    info!(?parsed, "engine config initialized");
    Ok(())
}

/// Check if config is initialized
#[pyfunction]
fn is_config_initialized() -> bool {
    CACHED_CONFIG.get().is_some()
}

/// Compile a rule string
///
/// # Raises
/// ValueError on a syntax error
#[pyfunction]
fn compile_rule(rule: &str) -> PyResult<PyCompiledRule> {
    let config = current_config();
    let ast = Compiler::new(&config).compile(rule)?;
    Ok(PyCompiledRule::new(Arc::new(ast)))
}

/// Compile (through the shared cache) and evaluate a rule string
///
/// # Arguments
/// * `rule` - Rule string, e.g. `(age > 18 AND region="US")`
/// * `data` - Dict of field name to bool, int, float or str
#[pyfunction]
fn evaluate_rule(rule: &str, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let config = current_config();
    let record = extract_record(data)?;
    let ast = cache::get_or_compile_with(&Compiler::new(&config), rule)?;
    Ok(Evaluator::new(&config).evaluate(&ast, &record)?)
}

/// Fold rule strings under `combine_type` ("AND" or "OR")
///
/// # Raises
/// ValueError when fewer than two rules are given or a rule does not compile
#[pyfunction]
fn combine_rules(rules: Vec<String>, combine_type: &str) -> PyResult<PyCompiledRule> {
    let operator = parse_combine_type(combine_type)?;
    let config = current_config();
    let ast = Compiler::new(&config).combine(&rules, operator)?;
    Ok(PyCompiledRule::new(Arc::new(ast)))
}

/// Evaluate a rule string asynchronously
///
/// The work runs on a Tokio blocking thread so the asyncio event loop stays
/// responsive.
///
/// # Example (Python)
/// ```python
/// ok = await evaluate_async('(age > 18 AND region="US")', {"age": 25, "region": "US"})
/// ```
#[pyfunction]
fn evaluate_async<'py>(
    py: Python<'py>,
    rule: String,
    data: &Bound<'py, PyDict>,
) -> PyResult<Bound<'py, PyAny>> {
    // Extract before leaving the GIL-bound context
    let record = extract_record(data)?;
    let config = current_config();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let result = tokio::task::spawn_blocking(move || {
            let ast = cache::get_or_compile_with(&Compiler::new(&config), &rule)?;
            Evaluator::new(&config).evaluate(&ast, &record)
        })
        .await
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Evaluation task panicked: {}",
                e
            ))
        })??;

        Ok(result)
    })
}

/// Drop every cached compiled rule
#[pyfunction]
fn clear_cache() {
    cache::clear_cache();
}

/// Number of cached compiled rules
#[pyfunction]
fn cache_size() -> usize {
    cache::cache_size()
}

/// Canonical rule string of `rule`, as the engine would print it back
#[pyfunction]
fn normalize_rule(rule: &str) -> PyResult<String> {
    let ast = Compiler::new(&current_config()).compile(rule)?;
    Ok(ast.to_string())
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn ast_rule_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_config, m)?)?;
    m.add_function(wrap_pyfunction!(is_config_initialized, m)?)?;
    m.add_function(wrap_pyfunction!(compile_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_async, m)?)?;
    m.add_function(wrap_pyfunction!(clear_cache, m)?)?;
    m.add_function(wrap_pyfunction!(cache_size, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_rule, m)?)?;
    m.add_class::<PyCompiledRule>()?;
    m.add_class::<PyRuleStore>()?;
    Ok(())
}
