//! Property-based tests for JSON rules.
//!
//! These tests use proptest to verify invariants around:
//! - validation totality (arbitrary JSON never panics `is_json_rule` or the loader)
//! - combinator laws (`not`, `and`, `or` agree with their operands)
//! - fail-closed evaluation (invalid patterns and unknown helpers never pass)

use crate::compile::{RuleContext, evaluate};
use crate::model::JsonCheck;
use crate::validate::{is_json_rule, parse_rule_file};
use netguard_model::ConfigNode;
use proptest::prelude::*;
use serde_json::{Value, json};

// ============================================================================
// Strategies
// ============================================================================

const WORDS: &[&str] = &["interface", "trunk", "shutdown", "vlan", "ntp", "Gig"];

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z_$.]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop::sample::select(vec![
                    "id", "type", "check", "metadata", "text", "conditions", "condition", "$ref",
                    "level", "obu", "owner", "version", "rules",
                ]),
                inner,
                0..5,
            )
            .prop_map(|m| Value::Object(m.into_iter().map(|(k, v)| (k.to_string(), v)).collect())),
        ]
    })
}

fn arb_leaf() -> impl Strategy<Value = JsonCheck> {
    prop_oneof![
        prop::sample::select(WORDS).prop_map(|w| JsonCheck::Contains {
            text: w.to_string()
        }),
        prop::sample::select(WORDS).prop_map(|w| JsonCheck::ChildExists {
            selector: w.to_string()
        }),
        prop::sample::select(WORDS).prop_map(|w| JsonCheck::Match {
            pattern: format!("(?i){w}"),
            flags: None
        }),
    ]
}

fn arb_check() -> impl Strategy<Value = JsonCheck> {
    arb_leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|conditions| JsonCheck::And { conditions }),
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|conditions| JsonCheck::Or { conditions }),
            inner.prop_map(|c| JsonCheck::Not {
                condition: Box::new(c)
            }),
        ]
    })
}

fn arb_node() -> impl Strategy<Value = ConfigNode> {
    (
        prop::collection::vec(prop::sample::select(WORDS), 1..4),
        prop::collection::vec(prop::sample::select(WORDS), 0..3),
    )
        .prop_map(|(id, children)| {
            ConfigNode::section(
                &id.join(" "),
                children.into_iter().map(ConfigNode::command).collect(),
            )
        })
}

proptest! {
    #[test]
    fn validation_never_panics(value in arb_json()) {
        let _ = is_json_rule(&value);
        let _ = parse_rule_file(&value.to_string());
    }

    #[test]
    fn not_inverts(check in arb_check(), node in arb_node()) {
        let ctx = RuleContext::default();
        let negated = JsonCheck::Not { condition: Box::new(check.clone()) };
        prop_assert_eq!(evaluate(&negated, &node, &ctx), !evaluate(&check, &node, &ctx));
    }

    #[test]
    fn combinators_agree_with_operands(
        checks in prop::collection::vec(arb_check(), 1..4),
        node in arb_node(),
    ) {
        let ctx = RuleContext::default();
        let each: Vec<bool> = checks.iter().map(|c| evaluate(c, &node, &ctx)).collect();
        let and = JsonCheck::And { conditions: checks.clone() };
        let or = JsonCheck::Or { conditions: checks };
        prop_assert_eq!(evaluate(&and, &node, &ctx), each.iter().all(|b| *b));
        prop_assert_eq!(evaluate(&or, &node, &ctx), each.iter().any(|b| *b));
    }

    #[test]
    fn broken_checks_fail_closed(node in arb_node(), negate in any::<bool>()) {
        let ctx = RuleContext::default();
        let broken = [
            JsonCheck::Match { pattern: "(".to_string(), flags: None },
            JsonCheck::NotMatch { pattern: "(".to_string(), flags: None },
            JsonCheck::Helper { helper: "vendor.missing".to_string(), args: vec![], negate },
            JsonCheck::Expr { expr: "globalThis".to_string() },
        ];
        for check in &broken {
            prop_assert!(!evaluate(check, &node, &ctx));
        }
    }
}
