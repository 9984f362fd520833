//! RuleStore - rule strings and their compiled trees, addressed by id

use crate::config::EngineConfig;
use crate::error::{Result, RuleError};
use crate::record::DataRecord;
use crate::rule::{combine_asts, combined_rule_string, AstNode, Compiler, Evaluator, LogOp};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Rule identifier; never reused within one store
pub type RuleId = u64;

/// A stored rule with its compiled tree
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRule {
    pub id: RuleId,
    pub rule_string: String,
    pub ast: Arc<AstNode>,
}

/// Thread-safe in-memory rule store
///
/// Identifiers come from a counter that only moves forward, so deleting a
/// rule never frees its id for a later rule.
#[derive(Debug)]
pub struct RuleStore {
    rules: RwLock<AHashMap<RuleId, StoredRule>>,
    next_id: AtomicU64,
    compiler: Compiler,
    evaluator: Evaluator,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl RuleStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rules: RwLock::new(AHashMap::new()),
            next_id: AtomicU64::new(1),
            compiler: Compiler::new(config),
            evaluator: Evaluator::new(config),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.read().contains_key(&id)
    }

    /// Compile and store a rule, returning its new id
    #[instrument(skip(self))]
    pub fn create(&self, rule_string: &str) -> Result<RuleId> {
        let ast = self.compile_checked(rule_string)?;
        let id = self.allocate_id();

        self.rules.write().insert(
            id,
            StoredRule {
                id,
                rule_string: rule_string.to_string(),
                ast,
            },
        );

        info!(rule_id = id, "rule created");
        Ok(id)
    }

    /// Replace the rule string stored under `id`
    #[instrument(skip(self))]
    pub fn update(&self, id: RuleId, rule_string: &str) -> Result<()> {
        if !self.contains(id) {
            warn!(rule_id = id, "update of unknown rule");
            return Err(RuleError::RuleNotFound(id));
        }

        let ast = self.compile_checked(rule_string)?;

        let mut rules = self.rules.write();
        // deleted between the check and the write lock
        let Some(stored) = rules.get_mut(&id) else {
            return Err(RuleError::RuleNotFound(id));
        };
        stored.rule_string = rule_string.to_string();
        stored.ast = ast;

        info!(rule_id = id, "rule updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: RuleId) -> Result<StoredRule> {
        match self.rules.write().remove(&id) {
            Some(removed) => {
                info!(rule_id = id, "rule deleted");
                Ok(removed)
            }
            None => {
                warn!(rule_id = id, "delete of unknown rule");
                Err(RuleError::RuleNotFound(id))
            }
        }
    }

    pub fn get(&self, id: RuleId) -> Option<StoredRule> {
        self.rules.read().get(&id).cloned()
    }

    /// All stored rules ordered by id
    pub fn list(&self) -> Vec<StoredRule> {
        let mut rules: Vec<StoredRule> = self.rules.read().values().cloned().collect();
        rules.sort_unstable_by_key(|r| r.id);
        rules
    }

    /// Store the combination of existing rules as a new rule.
    ///
    /// Unknown ids are skipped; at least two known rules must remain. The
    /// stored tree is the fold of the source trees, so the result does not
    /// depend on the nesting limit applied to the combined text.
    #[instrument(skip(self))]
    pub fn combine(&self, ids: &[RuleId], operator: LogOp) -> Result<RuleId> {
        let selected = self.collect_known(ids)?;
        let rule_strings: Vec<&str> = selected.iter().map(|r| r.rule_string.as_str()).collect();
        let combined = combined_rule_string(&rule_strings, operator)?;

        let ast = Arc::new(combine_asts(
            selected.iter().map(|r| Arc::clone(&r.ast)),
            operator,
        )?);
        let id = self.allocate_id();
        self.rules.write().insert(
            id,
            StoredRule {
                id,
                rule_string: combined,
                ast,
            },
        );

        info!(rule_id = id, sources = ?ids, %operator, "rules combined");
        Ok(id)
    }

    /// Evaluate the stored rule `id` against `data`
    pub fn evaluate(&self, id: RuleId, data: &DataRecord) -> Result<bool> {
        let ast = self
            .get(id)
            .map(|r| r.ast)
            .ok_or(RuleError::RuleNotFound(id))?;

        let result = self.evaluator.evaluate(&ast, data);
        debug!(rule_id = id, ?result, "rule evaluated");
        result
    }

    /// Evaluate the fold of several stored rules without storing it
    pub fn evaluate_combined(
        &self,
        ids: &[RuleId],
        operator: LogOp,
        data: &DataRecord,
    ) -> Result<bool> {
        let selected = self.collect_known(ids)?;
        let ast = combine_asts(selected.into_iter().map(|r| r.ast), operator)?;

        let result = self.evaluator.evaluate(&ast, data);
        debug!(rule_ids = ?ids, %operator, ?result, "combined rules evaluated");
        result
    }

    fn compile_checked(&self, rule_string: &str) -> Result<Arc<AstNode>> {
        if rule_string.trim().is_empty() {
            return Err(RuleError::EmptyRule);
        }
        Ok(Arc::new(self.compiler.compile(rule_string)?))
    }

    fn allocate_id(&self) -> RuleId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Stored rules for `ids` in the given order, skipping unknown ids
    fn collect_known(&self, ids: &[RuleId]) -> Result<Vec<StoredRule>> {
        let rules = self.rules.read();
        let selected: Vec<StoredRule> = ids
            .iter()
            .filter_map(|id| {
                let found = rules.get(id).cloned();
                if found.is_none() {
                    warn!(rule_id = *id, "skipping unknown rule");
                }
                found
            })
            .collect();

        if selected.len() < 2 {
            return Err(RuleError::NotEnoughRules(selected.len()));
        }
        Ok(selected)
    }
}
