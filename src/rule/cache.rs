//! Compiled rule cache - rule string to shared AST

use crate::error::Result;
use crate::record::DataRecord;
use crate::rule::ast::AstNode;
use crate::rule::evaluator;
use crate::rule::parser::Compiler;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

/// Compiled trees by nesting limit, then by rule string
type RuleCache = AHashMap<usize, AHashMap<String, Arc<AstNode>>>;

/// Global rule cache with fast hashing (ahash)
static RULE_CACHE: Lazy<RwLock<RuleCache>> = Lazy::new(|| RwLock::new(AHashMap::new()));

/// Get or compile a rule string, using cache for repeated rules.
/// Failed compilations are not cached.
#[inline]
pub fn get_or_compile(rule: &str) -> Result<Arc<AstNode>> {
    get_or_compile_with(&Compiler::default(), rule)
}

/// Same as `get_or_compile` with an explicit compiler.
/// Entries are kept per nesting limit, so a hit never outlives the limit
/// it was compiled under.
pub fn get_or_compile_with(compiler: &Compiler, rule: &str) -> Result<Arc<AstNode>> {
    let max_depth = compiler.max_depth();

    // Fast path: check read lock first
    {
        let cache = RULE_CACHE.read();
        if let Some(ast) = cache.get(&max_depth).and_then(|rules| rules.get(rule)) {
            return Ok(Arc::clone(ast));
        }
    }

    trace!(rule, max_depth, "rule cache miss");
    let ast = Arc::new(compiler.compile(rule)?);

    {
        let mut cache = RULE_CACHE.write();
        cache
            .entry(max_depth)
            .or_insert_with(|| AHashMap::with_capacity(256))
            .insert(rule.to_string(), Arc::clone(&ast));
    }

    Ok(ast)
}

/// Check a rule against a DataRecord, using cached AST.
/// An empty rule is a syntax error, exactly as with `compile`.
#[inline]
pub fn check_rule(rule: &str, data: &DataRecord) -> Result<bool> {
    let ast = get_or_compile(rule)?;
    evaluator::evaluate(&ast, data)
}

/// Clear the rule cache
pub fn clear_cache() {
    let mut cache = RULE_CACHE.write();
    cache.clear();
}

/// Get cache statistics
pub fn cache_size() -> usize {
    let cache = RULE_CACHE.read();
    cache.values().map(|rules| rules.len()).sum()
}
