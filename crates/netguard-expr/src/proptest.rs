//! Property-based tests for the evaluator.
//!
//! These tests use proptest to verify invariants around:
//! - safety (denied identifiers, over-length input and arbitrary text never evaluate to true
//!   by accident and never panic)
//! - purity (repeated evaluation agrees and leaves the node untouched)
//! - the step budget

use crate::{DENIED_IDENTIFIERS, DENYLIST, EvalLimits, ExprError, ExprEvaluator};
use netguard_model::ConfigNode;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Strategies
// ============================================================================

fn arb_node() -> impl Strategy<Value = ConfigNode> {
    (
        "[a-z]{1,8}( [A-Za-z0-9/.]{1,10}){0,3}",
        prop::collection::vec("[a-z]{1,8}( [a-z0-9]{1,6}){0,2}", 0..6),
    )
        .prop_map(|(id, children)| {
            ConfigNode::section(&id, children.iter().map(|c| ConfigNode::command(c)).collect())
        })
}

/// Expressions assembled from the grammar's own pieces.
fn arb_expr() -> impl Strategy<Value = String> {
    let atom = prop::sample::select(vec![
        "node.id",
        "node.type",
        "node.params.length",
        "node.children.length",
        "node.id.toLowerCase()",
        "node.params[0]",
        "'interface'",
        "1",
        "0",
        "true",
        "null",
        "/^[a-z]+/i",
        "hasChildCommand(node, 'shut')",
        "isShutdown(node)",
    ]);
    let op = prop::sample::select(vec![
        " == ", " != ", " && ", " || ", " + ", " < ", " >= ", " =~ ",
    ]);
    (atom.clone(), prop::collection::vec((op, atom), 0..6)).prop_map(|(first, rest)| {
        let mut out = first.to_string();
        for (op, atom) in rest {
            out.push_str(op);
            out.push_str(atom);
        }
        out
    })
}

proptest! {
    #[test]
    fn arbitrary_text_never_panics(src in ".{0,200}", node in arb_node()) {
        let evaluator = ExprEvaluator::default();
        let _ = evaluator.evaluate(&src, &node);
    }

    #[test]
    fn denied_identifiers_are_always_false(
        prefix in "[a-z. ]{0,10}",
        word in prop::sample::select(DENYLIST.to_vec()),
        suffix in "[a-z. ]{0,10}",
        node in arb_node(),
    ) {
        let evaluator = ExprEvaluator::default();
        let src = format!("true || {prefix}{}{suffix}", word.to_uppercase());
        prop_assert!(!evaluator.evaluate(&src, &node));
        prop_assert!(matches!(evaluator.try_evaluate(&src, &node), Err(ExprError::Denied(_))));
    }

    #[test]
    fn denied_identifier_tokens_are_always_false(
        before in prop::sample::select(vec![" ", "\t", "\n", " . ", "(", ", "]),
        word in prop::sample::select(DENIED_IDENTIFIERS.to_vec()),
        after in prop::sample::select(vec![" ", "\t", ".", " .", "(", ")"]),
        node in arb_node(),
    ) {
        let evaluator = ExprEvaluator::default();
        let src = format!("true || x{before}{}{after}y", word.to_uppercase());
        prop_assert!(!evaluator.evaluate(&src, &node));
        prop_assert_eq!(
            evaluator.try_evaluate(&src, &node),
            Err(ExprError::Denied(word.to_string()))
        );
    }

    #[test]
    fn over_length_is_always_false(extra in 1usize..200, node in arb_node()) {
        let evaluator = ExprEvaluator::default();
        let src = format!("true{}", " ".repeat(1000 + extra));
        prop_assert!(!evaluator.evaluate(&src, &node));
    }

    #[test]
    fn evaluation_is_pure(src in arb_expr(), node in arb_node()) {
        let evaluator = ExprEvaluator::default();
        let before = node.clone();
        let first = evaluator.try_evaluate(&src, &node);
        let second = evaluator.try_evaluate(&src, &node);
        prop_assert_eq!(first, second);
        prop_assert_eq!(node, before);
    }

    #[test]
    fn step_budget_is_never_exceeded(src in arb_expr(), node in arb_node(), budget in 1u64..40) {
        let limits = EvalLimits { step_budget: budget, ..EvalLimits::default() };
        let tight = ExprEvaluator::with_limits(Arc::new(netguard_helpers::builtin()), limits);
        let roomy = ExprEvaluator::default();
        match tight.try_evaluate(&src, &node) {
            Err(ExprError::BudgetExhausted(b)) => prop_assert_eq!(b, budget),
            other => prop_assert_eq!(other, roomy.try_evaluate(&src, &node)),
        }
    }
}
