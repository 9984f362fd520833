//! AST Rule Engine - boolean rule language compiler and evaluator
//!
//! Rule strings such as `(age > 18 AND region="US")` are compiled into an
//! immutable AST and evaluated against key-value data records. Several rules
//! can be folded under one logical operator, and an in-memory store keeps
//! rules under stable identifiers.
//!
//! Python bindings via PyO3 are available behind the `python` feature.

pub mod config;
pub mod error;
pub mod record;
pub mod rule;
pub mod store;

#[cfg(feature = "python")]
mod bindings;

pub use config::EngineConfig;
pub use error::{Result, RuleError};
pub use record::{DataRecord, Value};
pub use rule::{
    combine, combine_asts, compile, evaluate, AstNode, Comparison, Compiler, Evaluator, LogOp,
    Operand, RelOp,
};
pub use store::{RuleId, RuleStore, StoredRule};
