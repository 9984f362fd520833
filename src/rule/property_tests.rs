//! Property tests for rule module

use proptest::prelude::*;
use std::sync::Arc;

use crate::error::RuleError;
use crate::record::DataRecord;
use crate::rule::ast::{AstNode, LogOp, RelOp};
use crate::rule::combinator::{combine, combined_rule_string};
use crate::rule::evaluator::evaluate;
use crate::rule::parser::compile;

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Generate field names
fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("age".to_string()),
        Just("score".to_string()),
        Just("level".to_string()),
        Just("isActive".to_string()),
        Just("region".to_string()),
    ]
}

/// Generate relational operators with their source symbol
fn relop_strategy() -> impl Strategy<Value = (RelOp, &'static str)> {
    prop_oneof![
        Just((RelOp::Lt, "<")),
        Just((RelOp::Gt, ">")),
        Just((RelOp::Le, "<=")),
        Just((RelOp::Ge, ">=")),
    ]
}

fn logop_strategy() -> impl Strategy<Value = LogOp> {
    prop_oneof![Just(LogOp::And), Just(LogOp::Or)]
}

/// Generate equality values, including ones with spaces
fn literal_text_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,8}( [A-Za-z0-9_]{1,8})?"
}

/// Generate leaf nodes
fn leaf_strategy() -> impl Strategy<Value = AstNode> {
    prop_oneof![
        field_name_strategy().prop_map(AstNode::field),
        (field_name_strategy(), literal_text_strategy())
            .prop_map(|(field, value)| AstNode::equals(field, value)),
        (field_name_strategy(), relop_strategy(), -1000..=1000i32)
            .prop_map(|(field, (op, _), n)| AstNode::comparison(field, op, n as f64 / 4.0)),
    ]
}

/// Generate arbitrary trees up to a few levels deep
fn ast_strategy() -> impl Strategy<Value = AstNode> {
    leaf_strategy().prop_recursive(4, 32, 2, |inner| {
        (inner.clone(), inner, logop_strategy())
            .prop_map(|(left, right, op)| AstNode::logical(Arc::new(left), Arc::new(right), op))
    })
}

/// Generate records over the same field names
fn record_strategy() -> impl Strategy<Value = DataRecord> {
    (
        prop::option::of(-300..=300i32),
        prop::option::of(-300..=300i32),
        prop::option::of(any::<bool>()),
        prop::option::of(literal_text_strategy()),
    )
        .prop_map(|(age, score, active, region)| {
            let mut record = DataRecord::new();
            if let Some(age) = age {
                record.insert("age", age);
            }
            if let Some(score) = score {
                record.insert("score", score);
            }
            if let Some(active) = active {
                record.insert("isActive", active);
            }
            if let Some(region) = region {
                record.insert("region", region);
            }
            record
        })
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Comparison rules compile to a Comparison node with the given parts
    #[test]
    fn prop_comparison_structure(
        field in field_name_strategy(),
        (op, symbol) in relop_strategy(),
        value in -1000..=1000i32
    ) {
        let rule = format!("{} {} {}", field, symbol, value);
        let ast = compile(&rule).unwrap();
        prop_assert_eq!(ast, AstNode::comparison(field, op, value as f64));
    }

    /// Comparison evaluation matches arithmetic
    #[test]
    fn prop_comparison_evaluation(
        (op, symbol) in relop_strategy(),
        threshold in -50..=50i32,
        actual in -50..=50i32
    ) {
        let ast = compile(&format!("age {} {}", symbol, threshold)).unwrap();
        let result = evaluate(&ast, &DataRecord::new().with("age", actual)).unwrap();
        let expected = match op {
            RelOp::Lt => actual < threshold,
            RelOp::Gt => actual > threshold,
            RelOp::Le => actual <= threshold,
            RelOp::Ge => actual >= threshold,
        };
        prop_assert_eq!(result, expected);
    }

    /// Missing fields never error and never hold
    #[test]
    fn prop_missing_field_is_false(
        (_, symbol) in relop_strategy(),
        threshold in -50..=50i32,
        value in literal_text_strategy()
    ) {
        let empty = DataRecord::new();
        let cmp = compile(&format!("missing {} {}", symbol, threshold)).unwrap();
        prop_assert!(!evaluate(&cmp, &empty).unwrap());
        let eq = compile(&format!("missing=\"{}\"", value)).unwrap();
        prop_assert!(!evaluate(&eq, &empty).unwrap());
        prop_assert!(!evaluate(&compile("missing").unwrap(), &empty).unwrap());
    }

    /// Rendering any tree and compiling it back yields an equal tree
    #[test]
    fn prop_display_recompiles(ast in ast_strategy()) {
        let rendered = ast.to_string();
        let recompiled = compile(&rendered);
        prop_assert_eq!(recompiled, Ok(ast), "Rendered: {}", rendered);
    }

    /// Compiling twice gives equal trees that evaluate identically
    #[test]
    fn prop_compile_deterministic(ast in ast_strategy(), data in record_strategy()) {
        let rule = ast.to_string();
        let first = compile(&rule).unwrap();
        let second = compile(&rule).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(evaluate(&first, &data), evaluate(&second, &data));
    }

    /// Logical nodes agree with boolean algebra over their children
    #[test]
    fn prop_logical_semantics(
        left in ast_strategy(),
        right in ast_strategy(),
        op in logop_strategy(),
        data in record_strategy()
    ) {
        let l = evaluate(&left, &data);
        let r = evaluate(&right, &data);
        let combined = evaluate(&AstNode::logical(Arc::new(left), Arc::new(right), op), &data);

        match (l, r) {
            (Ok(l), Ok(r)) => prop_assert_eq!(combined, Ok(op.apply(l, r))),
            _ => prop_assert!(combined.is_err()),
        }
    }

    /// AND-combined equality rules hold only when every equality holds;
    /// OR-combined ones when at least one does
    #[test]
    fn prop_combine_all_any(
        expected in prop::collection::vec(0..3i32, 2..=6),
        actual in prop::collection::vec(0..3i32, 6)
    ) {
        let rules: Vec<String> = expected
            .iter()
            .enumerate()
            .map(|(i, v)| format!("f{}={}", i, v))
            .collect();
        let data: DataRecord = actual
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("f{}", i), *v))
            .collect();
        let hits: Vec<bool> = expected.iter().zip(&actual).map(|(e, a)| e == a).collect();

        let all = combine(&rules, LogOp::And).unwrap();
        prop_assert_eq!(evaluate(&all, &data).unwrap(), hits.iter().all(|h| *h));

        let any = combine(&rules, LogOp::Or).unwrap();
        prop_assert_eq!(evaluate(&any, &data).unwrap(), hits.iter().any(|h| *h));

        let text = combined_rule_string(&rules, LogOp::And).unwrap();
        prop_assert_eq!(compile(&text).unwrap(), all);
    }

    /// Words that are not numbers are rejected as comparison literals
    #[test]
    fn prop_non_numeric_literal_rejected(
        (_, symbol) in relop_strategy(),
        word in "[a-z][a-z_]{0,10}"
    ) {
        let result = compile(&format!("age {} {}", symbol, word));
        prop_assert!(
            matches!(result, Err(RuleError::Syntax { index: 2, .. })),
            "Unexpected: {:?}",
            result
        );
    }

    /// Arbitrary input never panics the compiler
    #[test]
    fn prop_compile_total(input in "[a-z0-9 ()<>=\"&|ANDOR]{0,40}") {
        let _ = compile(&input);
    }
}
