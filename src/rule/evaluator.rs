//! Rule evaluator

use crate::config::EngineConfig;
use crate::error::{Result, RuleError};
use crate::record::{DataRecord, Value};
use crate::rule::ast::{AstNode, Comparison, Operand};

/// Evaluate an AST against a DataRecord using the default configuration
pub fn evaluate(ast: &AstNode, data: &DataRecord) -> Result<bool> {
    Evaluator::default().evaluate(ast, data)
}

/// Stateless evaluator; holds only the numeric coercion policy
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    coerce_numeric_strings: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            coerce_numeric_strings: config.coerce_numeric_strings,
        }
    }

    /// Both sides of a Logical node are evaluated, so an error on either side
    /// surfaces regardless of the other side's value.
    pub fn evaluate(&self, ast: &AstNode, data: &DataRecord) -> Result<bool> {
        match ast {
            AstNode::Operand(operand) => Ok(check_operand(operand, data)),
            AstNode::Comparison(cmp) => self.check_comparison(cmp, data),
            AstNode::Logical {
                left,
                right,
                operator,
            } => {
                let left = self.evaluate(left, data)?;
                let right = self.evaluate(right, data)?;
                Ok(operator.apply(left, right))
            }
        }
    }

    fn check_comparison(&self, cmp: &Comparison, data: &DataRecord) -> Result<bool> {
        let Some(value) = data.get(&cmp.field) else {
            return Ok(false);
        };

        match value.as_number(self.coerce_numeric_strings) {
            Some(number) => Ok(cmp.operator.apply(number, cmp.literal)),
            None => Err(RuleError::eval(
                &cmp.field,
                format!(
                    "cannot compare {} value {} with '{} {}'",
                    value.type_name(),
                    value,
                    cmp.operator,
                    cmp.literal
                ),
            )),
        }
    }
}

#[inline]
fn check_operand(operand: &Operand, data: &DataRecord) -> bool {
    match operand {
        Operand::Equals { field, value } => data
            .get(field)
            .map(|v| v.matches_literal(value))
            .unwrap_or(false),
        Operand::Field(name) => data.get(name).map(Value::truthy).unwrap_or(false),
    }
}
