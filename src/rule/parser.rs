//! Recursive-descent rule compiler
//!
//! Grammar:
//!
//! ```text
//! expr := '(' expr LOGOP expr ')'
//!       | FIELD RELOP NUMBER
//!       | OPERAND
//! ```

use crate::config::EngineConfig;
use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, LogOp, Operand};
use crate::rule::lexer::{tokenize, Token};
use tracing::debug;

/// Compile a rule string into an AST using the default configuration
pub fn compile(rule: &str) -> Result<AstNode> {
    Compiler::default().compile(rule)
}

/// Rule compiler carrying the nesting limit from EngineConfig
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    max_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Compiler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Tokenize and parse a rule string
    pub fn compile(&self, rule: &str) -> Result<AstNode> {
        let tokens = tokenize(rule);
        debug!(rule, token_count = tokens.len(), "compiling rule");
        self.parse_tokens(&tokens)
    }

    /// Parse an already tokenized rule; every token must be consumed
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<AstNode> {
        if tokens.is_empty() {
            return Err(RuleError::syntax(0, "empty rule"));
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            max_depth: self.max_depth,
        };
        let ast = parser.parse_expr(0)?;

        if let Some(extra) = parser.peek() {
            return Err(RuleError::syntax(
                parser.pos,
                format!("unexpected trailing token '{}'", extra.text()),
            ));
        }

        Ok(ast)
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    #[inline]
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self, depth: usize) -> Result<AstNode> {
        let index = self.pos;
        match self.advance() {
            None => Err(RuleError::syntax(
                index,
                "expected an operand, found end of input",
            )),
            Some(Token::OpenParen) => self.parse_group(index, depth + 1),
            Some(Token::Word(word)) => self.parse_word(word),
            Some(Token::Equality(raw)) => Ok(AstNode::Operand(parse_equality(raw))),
            Some(Token::CloseParen) => Err(RuleError::syntax(index, "unexpected ')'")),
            Some(token @ (Token::RelOp(_) | Token::LogOp(_))) => Err(RuleError::syntax(
                index,
                format!("expected an operand, found '{}'", token.text()),
            )),
        }
    }

    /// Parses `expr LOGOP expr ')'` after the opening parenthesis at `open_index`
    fn parse_group(&mut self, open_index: usize, depth: usize) -> Result<AstNode> {
        if depth > self.max_depth {
            return Err(RuleError::syntax(
                open_index,
                format!("nesting exceeds maximum depth of {}", self.max_depth),
            ));
        }

        let left = self.parse_expr(depth)?;
        let operator = self.expect_logop()?;
        let right = self.parse_expr(depth)?;

        let close_index = self.pos;
        match self.advance() {
            Some(Token::CloseParen) => Ok(AstNode::logical(left, right, operator)),
            Some(other) => Err(RuleError::syntax(
                close_index,
                format!("expected ')', found '{}'", other.text()),
            )),
            None => Err(RuleError::syntax(
                open_index,
                "unbalanced parentheses: '(' is never closed",
            )),
        }
    }

    fn expect_logop(&mut self) -> Result<LogOp> {
        let index = self.pos;
        match self.advance() {
            Some(Token::LogOp(op)) => Ok(*op),
            Some(Token::RelOp(op)) => Err(RuleError::syntax(
                index,
                format!("comparison operator '{}' cannot join a group, expected AND or OR", op),
            )),
            Some(other) => Err(RuleError::syntax(
                index,
                format!("expected AND or OR, found '{}'", other.text()),
            )),
            None => Err(RuleError::syntax(
                index,
                "expected AND or OR, found end of input",
            )),
        }
    }

    /// A word is a bare field reference unless a relational operator follows
    fn parse_word(&mut self, word: &str) -> Result<AstNode> {
        let Some(Token::RelOp(operator)) = self.peek() else {
            return Ok(AstNode::field(word));
        };
        let operator = *operator;
        self.pos += 1;

        let literal_index = self.pos;
        match self.advance() {
            Some(Token::Word(text)) => match text.parse::<f64>() {
                Ok(literal) if literal.is_finite() => {
                    Ok(AstNode::comparison(word, operator, literal))
                }
                _ => Err(RuleError::syntax(
                    literal_index,
                    format!("expected a numeric literal after '{}', found '{}'", operator, text),
                )),
            },
            Some(other) => Err(RuleError::syntax(
                literal_index,
                format!(
                    "expected a numeric literal after '{}', found '{}'",
                    operator,
                    other.text()
                ),
            )),
            None => Err(RuleError::syntax(
                literal_index,
                format!("expected a numeric literal after '{}', found end of input", operator),
            )),
        }
    }
}

/// Split `key=value` once on the first `=`, trimming both sides and removing
/// one layer of double quotes from the value
fn parse_equality(raw: &str) -> Operand {
    let (field, value) = raw.split_once('=').unwrap_or((raw, ""));
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);

    Operand::Equals {
        field: field.trim().to_string(),
        value: value.to_string(),
    }
}
