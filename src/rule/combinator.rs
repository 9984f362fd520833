//! Folding several rules into one tree under a single logical operator

use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, LogOp};
use crate::rule::parser::Compiler;
use std::sync::Arc;

/// Compile each rule and left-fold them: `((r1 OP r2) OP r3) ...`
///
/// At least two rules are required; fewer yields `NotEnoughRules`.
pub fn combine<S: AsRef<str>>(rules: &[S], operator: LogOp) -> Result<AstNode> {
    Compiler::default().combine(rules, operator)
}

/// Left-fold already compiled trees; the sub-trees are shared, not copied
pub fn combine_asts<I>(asts: I, operator: LogOp) -> Result<AstNode>
where
    I: IntoIterator<Item = Arc<AstNode>>,
{
    let mut iter = asts.into_iter();
    let (first, second) = match (iter.next(), iter.next()) {
        (Some(first), Some(second)) => (first, second),
        (Some(_), None) => return Err(RuleError::NotEnoughRules(1)),
        _ => return Err(RuleError::NotEnoughRules(0)),
    };

    let root = iter.fold(AstNode::logical(first, second, operator), |acc, next| {
        AstNode::logical(acc, next, operator)
    });
    Ok(root)
}

/// Rule string matching the fold performed by `combine`
pub fn combined_rule_string<S: AsRef<str>>(rules: &[S], operator: LogOp) -> Result<String> {
    if rules.len() < 2 {
        return Err(RuleError::NotEnoughRules(rules.len()));
    }

    let mut iter = rules.iter().map(|r| r.as_ref().trim());
    let mut combined = iter.next().unwrap_or_default().to_string();
    for rule in iter {
        combined = format!("({} {} {})", combined, operator, rule);
    }
    Ok(combined)
}

impl Compiler {
    /// Compile and fold rules with this compiler's configuration
    pub fn combine<S: AsRef<str>>(&self, rules: &[S], operator: LogOp) -> Result<AstNode> {
        if rules.len() < 2 {
            return Err(RuleError::NotEnoughRules(rules.len()));
        }

        let asts = rules
            .iter()
            .map(|rule| self.compile(rule.as_ref()).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        combine_asts(asts, operator)
    }
}
