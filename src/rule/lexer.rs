//! Rule string tokenizer

use crate::rule::ast::{LogOp, RelOp};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Token buffer; typical rules fit without spilling to the heap
pub type Tokens = SmallVec<[Token; 16]>;

/// Lexical unit of a rule string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or numeric text
    Word(String),
    /// Whole `key=value` unit, value possibly quoted
    Equality(String),
    RelOp(RelOp),
    LogOp(LogOp),
    OpenParen,
    CloseParen,
}

impl Token {
    /// Source-like text of the token for error messages
    pub fn text(&self) -> &str {
        match self {
            Token::Word(w) | Token::Equality(w) => w.as_str(),
            Token::RelOp(op) => op.symbol(),
            Token::LogOp(op) => op.keyword(),
            Token::OpenParen => "(",
            Token::CloseParen => ")",
        }
    }
}

// Alternation order matters: equality units first so `region="US"` stays whole,
// then two-char operators before their one-char prefixes. The value of an
// equality unit is optional, so a dangling `key=` is always an equality.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<eq>\w+\s*=(?P<val>\s*"[^"]*"|\s*[\w.\-]+)?)"#,
        r#"|(?P<rel><=|>=|<|>)|(?P<open>\()|(?P<close>\))"#,
        r#"|(?P<num>-?\d+(?:\.\d+)?\b)|(?P<word>\w+)"#,
    ))
    .expect("token pattern is valid")
});

fn keyword(word: &str) -> Option<LogOp> {
    match word {
        "AND" => Some(LogOp::And),
        "OR" => Some(LogOp::Or),
        _ => None,
    }
}

/// `AND` / `OR` separated from the `=` by whitespace
fn spaced_keyword(value: &str) -> Option<LogOp> {
    let word = value.trim_start();
    if word.len() == value.len() {
        return None;
    }
    keyword(word)
}

/// Split a rule string into tokens; whitespace and unmatched characters are dropped
pub fn tokenize(rule: &str) -> Tokens {
    let mut tokens = Tokens::new();

    for caps in TOKEN_PATTERN.captures_iter(rule) {
        let token = if let Some(m) = caps.name("eq") {
            let split = caps
                .name("val")
                .and_then(|val| spaced_keyword(val.as_str()).map(|op| (val.start(), op)));
            match split {
                // `key= AND ...`: the keyword joins the group and the value is empty
                Some((value_start, op)) => {
                    tokens.push(Token::Equality(rule[m.start()..value_start].to_string()));
                    Token::LogOp(op)
                }
                None => Token::Equality(m.as_str().to_string()),
            }
        } else if let Some(m) = caps.name("rel") {
            match RelOp::from_symbol(m.as_str()) {
                Some(op) => Token::RelOp(op),
                None => continue,
            }
        } else if caps.name("open").is_some() {
            Token::OpenParen
        } else if caps.name("close").is_some() {
            Token::CloseParen
        } else if let Some(m) = caps.name("num").or_else(|| caps.name("word")) {
            match keyword(m.as_str()) {
                Some(op) => Token::LogOp(op),
                None => Token::Word(m.as_str().to_string()),
            }
        } else {
            continue;
        };
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(
            tokenize("age >= 18").as_slice(),
            &[word("age"), Token::RelOp(RelOp::Ge), word("18")]
        );
        assert_eq!(
            tokenize("age<18").as_slice(),
            &[word("age"), Token::RelOp(RelOp::Lt), word("18")]
        );
    }

    #[test]
    fn test_equality_kept_whole() {
        assert_eq!(
            tokenize(r#"region="US""#).as_slice(),
            &[Token::Equality(r#"region="US""#.to_string())]
        );
        assert_eq!(
            tokenize(r#"city = "New York""#).as_slice(),
            &[Token::Equality(r#"city = "New York""#.to_string())]
        );
        assert_eq!(
            tokenize("a=1.5").as_slice(),
            &[Token::Equality("a=1.5".to_string())]
        );
    }

    #[test]
    fn test_dangling_equals_is_equality() {
        let eq = |s: &str| Token::Equality(s.to_string());
        assert_eq!(tokenize("x=").as_slice(), &[eq("x=")]);
        assert_eq!(tokenize("x = ").as_slice(), &[eq("x =")]);
        assert_eq!(
            tokenize("(x=)").as_slice(),
            &[Token::OpenParen, eq("x="), Token::CloseParen]
        );
    }

    #[test]
    fn test_value_stops_before_spaced_keyword() {
        let eq = |s: &str| Token::Equality(s.to_string());
        assert_eq!(
            tokenize("(flag= AND b)").as_slice(),
            &[
                Token::OpenParen,
                eq("flag="),
                Token::LogOp(LogOp::And),
                word("b"),
                Token::CloseParen,
            ]
        );
        assert_eq!(
            tokenize("(a = OR b=)").as_slice(),
            &[
                Token::OpenParen,
                eq("a ="),
                Token::LogOp(LogOp::Or),
                eq("b="),
                Token::CloseParen,
            ]
        );
        // written without a space the keyword is an ordinary value
        assert_eq!(tokenize("x=AND").as_slice(), &[eq("x=AND")]);
        assert_eq!(tokenize("x= ANDROID").as_slice(), &[eq("x= ANDROID")]);
        assert_eq!(tokenize("x = 1").as_slice(), &[eq("x = 1")]);
    }

    #[test]
    fn test_logical_group() {
        let tokens = tokenize(r#"(age > 18 AND region="US")"#);
        assert_eq!(
            tokens.as_slice(),
            &[
                Token::OpenParen,
                word("age"),
                Token::RelOp(RelOp::Gt),
                word("18"),
                Token::LogOp(LogOp::And),
                Token::Equality(r#"region="US""#.to_string()),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(
            tokenize("score > -2.5").as_slice(),
            &[word("score"), Token::RelOp(RelOp::Gt), word("-2.5")]
        );
        // digits followed by letters are a single word
        assert_eq!(tokenize("18abc").as_slice(), &[word("18abc")]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            tokenize("a and b OR c").as_slice(),
            &[word("a"), word("and"), word("b"), Token::LogOp(LogOp::Or), word("c")]
        );
        assert_eq!(tokenize("ANDROID").as_slice(), &[word("ANDROID")]);
    }

    #[test]
    fn test_unmatched_characters_dropped() {
        assert_eq!(
            tokenize("a & b ; !").as_slice(),
            &[word("a"), word("b")]
        );
    }

    #[test]
    fn test_token_text() {
        assert_eq!(Token::RelOp(RelOp::Le).text(), "<=");
        assert_eq!(Token::LogOp(LogOp::Or).text(), "OR");
        assert_eq!(Token::CloseParen.text(), ")");
    }
}
