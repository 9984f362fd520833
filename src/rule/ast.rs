//! Abstract Syntax Tree for rule expressions

use crate::error::RuleError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// AST node for rule expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Leaf operand like `isActive` or `region="US"`
    Operand(Operand),
    /// Relational comparison like `age > 18`
    Comparison(Comparison),
    /// AND / OR over two sub-trees
    Logical {
        left: Arc<AstNode>,
        right: Arc<AstNode>,
        operator: LogOp,
    },
}

/// Operand kind, resolved at compile time
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `field=value`, value already unquoted
    Equals { field: String, value: String },
    /// Bare field reference, evaluated for truthiness
    Field(String),
}

/// `<field> <relop> <number>` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub operator: RelOp,
    pub literal: f64,
}

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// Less than (<)
    Lt,
    /// Greater than (>)
    Gt,
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogOp {
    And,
    Or,
}

impl AstNode {
    /// Build a Logical node over two shared sub-trees
    pub fn logical(
        left: impl Into<Arc<AstNode>>,
        right: impl Into<Arc<AstNode>>,
        operator: LogOp,
    ) -> Self {
        AstNode::Logical {
            left: left.into(),
            right: right.into(),
            operator,
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        AstNode::Operand(Operand::Field(name.into()))
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        AstNode::Operand(Operand::Equals {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn comparison(field: impl Into<String>, operator: RelOp, literal: f64) -> Self {
        AstNode::Comparison(Comparison {
            field: field.into(),
            operator,
            literal,
        })
    }

    /// Height of the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            AstNode::Operand(_) | AstNode::Comparison(_) => 1,
            AstNode::Logical { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of Operand and Comparison leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            AstNode::Operand(_) | AstNode::Comparison(_) => 1,
            AstNode::Logical { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

impl RelOp {
    /// Parse a relational operator token
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(RelOp::Lt),
            ">" => Some(RelOp::Gt),
            "<=" => Some(RelOp::Le),
            ">=" => Some(RelOp::Ge),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        }
    }

    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            RelOp::Lt => lhs < rhs,
            RelOp::Gt => lhs > rhs,
            RelOp::Le => lhs <= rhs,
            RelOp::Ge => lhs >= rhs,
        }
    }
}

impl LogOp {
    pub fn keyword(self) -> &'static str {
        match self {
            LogOp::And => "AND",
            LogOp::Or => "OR",
        }
    }

    #[inline]
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            LogOp::And => lhs && rhs,
            LogOp::Or => lhs || rhs,
        }
    }
}

impl FromStr for LogOp {
    type Err = RuleError;

    /// Accepts `AND` / `OR` in any case, as supplied by callers choosing a combine type
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("AND") {
            Ok(LogOp::And)
        } else if s.eq_ignore_ascii_case("OR") {
            Ok(LogOp::Or)
        } else {
            Err(RuleError::InvalidOperator(s.to_string()))
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Renders the canonical rule string; it compiles back to an equal tree
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Operand(Operand::Field(name)) => f.write_str(name),
            AstNode::Operand(Operand::Equals { field, value }) => {
                write!(f, "{}=\"{}\"", field, value)
            }
            AstNode::Comparison(cmp) => {
                write!(f, "{} {} {}", cmp.field, cmp.operator, cmp.literal)
            }
            AstNode::Logical {
                left,
                right,
                operator,
            } => write!(f, "({} {} {})", left, operator, right),
        }
    }
}
