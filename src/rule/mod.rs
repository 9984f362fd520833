//! Rule compilation and evaluation module
//!
//! This module handles compiling rule strings like `(age > 18 AND region="US")`
//! into an AST and evaluating that AST against a DataRecord.

mod ast;
pub mod cache;
mod combinator;
mod evaluator;
pub mod lexer;
pub mod parser;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use cache::*;
pub use combinator::*;
pub use evaluator::*;
pub use parser::*;
