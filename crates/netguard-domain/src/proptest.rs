//! Property-based tests for the rule engine.
//!
//! These tests use proptest to verify invariants around:
//! - totality (one result per matching node, vendor filtering included)
//! - isolation (failing or panicking checks never suppress other results)
//! - ordering and truncation determinism

use crate::engine::{evaluate, run};
use crate::policy::EngineConfig;
use crate::rule::Rule;
use crate::selector::{Selector, VendorFilter};
use crate::test_support::{always, panicking, rule};
use netguard_model::{ConfigNode, preorder};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const WORDS: &[&str] = &["interface", "ip", "hostname", "router", "ntp", "switchport"];
const VENDORS: &[&str] = &["cisco-ios", "juniper-junos", "arista-eos"];

fn arb_id() -> impl Strategy<Value = String> {
    (prop::sample::select(WORDS), "[a-z0-9/]{0,6}").prop_map(|(w, rest)| format!("{w} {rest}"))
}

fn arb_tree() -> impl Strategy<Value = ConfigNode> {
    let leaf = arb_id().prop_map(|id| ConfigNode::command(&id));
    leaf.prop_recursive(3, 24, 4, |inner| {
        (arb_id(), prop::collection::vec(inner, 0..4))
            .prop_map(|(id, children)| ConfigNode::section(&id, children))
    })
}

fn arb_forest() -> impl Strategy<Value = Vec<ConfigNode>> {
    (
        prop::collection::vec(arb_tree(), 0..6),
        prop::option::of(prop::sample::select(VENDORS)),
    )
        .prop_map(|(forest, vendor)| match vendor {
            Some(v) => forest.into_iter().map(|n| n.with_vendor(v)).collect(),
            None => forest,
        })
}

fn arb_selector() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        prop::sample::select(WORDS).prop_map(str::to_uppercase),
        prop::sample::select(WORDS).prop_map(|w| format!("/^{w}/i")),
    ]
}

fn matching(forest: &[ConfigNode], rule: &Rule) -> usize {
    preorder(forest).filter(|n| rule.applies_to(n)).count()
}

proptest! {
    #[test]
    fn one_result_per_matching_node(forest in arb_forest(), sel in arb_selector()) {
        let rules = [rule("r", &sel, always(true))];
        let results = run(&forest, &rules);
        prop_assert_eq!(results.len(), matching(&forest, &rules[0]));
        let selector = Selector::parse(&sel).expect("selector");
        prop_assert_eq!(
            results.len(),
            preorder(&forest).filter(|n| selector.matches(&n.id)).count()
        );
    }

    #[test]
    fn vendor_filter_restricts_results(
        forest in arb_forest(),
        pattern in prop::sample::select(vec!["cisco-*", "juniper-*", "*-eos"]),
    ) {
        let filtered = rule("r", "*", always(true))
            .with_vendor(VendorFilter::new([pattern]).expect("filter"));
        let expected = matching(&forest, &filtered);
        let results = run(&forest, std::slice::from_ref(&filtered));
        prop_assert_eq!(results.len(), expected);
        for node in preorder(&forest) {
            let vendor_ok = node.vendor.as_deref().is_none_or(|v| {
                VendorFilter::new([pattern]).expect("filter").matches(v)
            });
            prop_assert_eq!(filtered.applies_to(node), vendor_ok);
        }
    }

    #[test]
    fn panicking_rule_does_not_suppress_others(forest in arb_forest(), sel in arb_selector()) {
        let healthy = rule("ok", &sel, always(false));
        let expected = matching(&forest, &healthy);
        let rules = [rule("boom", "*", panicking()), healthy];
        let results = run(&forest, &rules);

        let ok: Vec<_> = results.iter().filter(|r| r.rule_id == "ok").collect();
        prop_assert_eq!(ok.len(), expected);
        prop_assert!(ok.iter().all(|r| !r.passed && !r.is_error()));

        let boom = results.iter().filter(|r| r.rule_id == "boom").count();
        prop_assert_eq!(boom, preorder(&forest).count());
    }

    #[test]
    fn evaluation_is_deterministic(forest in arb_forest(), max in prop::option::of(0usize..8)) {
        let rules = [rule("a", "*", always(false)), rule("b", "interface", always(true))];
        let cfg = EngineConfig { max_results: max, ..EngineConfig::default() };
        let first = evaluate(&forest, &rules, &cfg);
        let second = evaluate(&forest, &rules, &cfg);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first.truncated_reason.is_some(),
            max.is_some_and(|m| (first.results_total as usize) > m)
        );
    }
}
