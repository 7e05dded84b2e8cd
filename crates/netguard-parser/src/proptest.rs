//! Property-based tests for the parser.
//!
//! These tests use proptest to verify invariants around:
//! - determinism (identical trees, locations included)
//! - the depth invariant and vendor stamping
//! - re-rendering an indent tree reproduces its nesting
//! - robustness on arbitrary input for every preset

use crate::{BlockStyle, SchemaDescriptor, parse, presets};
use netguard_model::{ConfigNode, count_nodes, preorder};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Lines mixing indentation, structural characters, quotes and comment markers.
fn arb_config_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[ \t]{0,6}[a-z0-9{};\"'#!/^\\\\ ]{0,16}", 0..24)
        .prop_map(|lines| lines.join("\n"))
}

/// Plain indented statements: letters only, no comments or structure.
fn arb_indented_lines() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0usize..6, "[a-z][a-z0-9]{0,8}"), 0..24)
}

fn arb_preset() -> impl Strategy<Value = SchemaDescriptor> {
    prop::sample::select(presets::available().to_vec())
        .prop_map(|name| presets::lookup(name).unwrap_or_else(|| panic!("preset {name}")))
}

fn shape(forest: &[ConfigNode]) -> Vec<(usize, String)> {
    preorder(forest).map(|n| (n.depth, n.id.clone())).collect()
}

fn check_depths(nodes: &[ConfigNode], depth: usize) -> Result<(), TestCaseError> {
    for node in nodes {
        prop_assert_eq!(node.depth, depth, "node {:?}", node.id);
        check_depths(&node.children, depth + 1)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn parsing_is_deterministic(text in arb_config_text(), schema in arb_preset()) {
        let first = parse(&text, &schema);
        let second = parse(&text, &schema);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn depth_invariant_holds(text in arb_config_text(), schema in arb_preset()) {
        let forest = parse(&text, &schema);
        check_depths(&forest, 0)?;
    }

    #[test]
    fn every_node_carries_the_schema_vendor(text in arb_config_text(), schema in arb_preset()) {
        let forest = parse(&text, &schema);
        for node in preorder(&forest) {
            prop_assert_eq!(node.vendor.as_deref(), Some(schema.vendor.as_str()));
        }
    }

    #[test]
    fn locations_point_at_real_lines(text in arb_config_text(), schema in arb_preset()) {
        let physical = text.split('\n').count() as u32;
        for node in preorder(&parse(&text, &schema)) {
            prop_assert!(node.loc.line >= 1 && node.loc.line <= physical);
            prop_assert!(node.loc.col >= 1);
        }
    }

    #[test]
    fn indent_style_keeps_one_node_per_statement(lines in arb_indented_lines()) {
        let text: String = lines
            .iter()
            .map(|(indent, word)| format!("{}{}\n", " ".repeat(*indent), word))
            .collect();
        let schema = SchemaDescriptor::new("t", BlockStyle::Indent);
        let forest = parse(&text, &schema);
        prop_assert_eq!(count_nodes(&forest), lines.len());

        let ids: Vec<&str> = preorder(&forest).map(|n| n.id.as_str()).collect();
        let words: Vec<&str> = lines.iter().map(|(_, w)| w.as_str()).collect();
        prop_assert_eq!(ids, words);
    }

    #[test]
    fn rendering_by_depth_reproduces_the_tree(lines in arb_indented_lines()) {
        let text: String = lines
            .iter()
            .map(|(indent, word)| format!("{}{}\n", " ".repeat(*indent), word))
            .collect();
        let schema = SchemaDescriptor::new("t", BlockStyle::Indent);
        let forest = parse(&text, &schema);

        let rendered: String = preorder(&forest)
            .map(|n| format!("{}{}\n", " ".repeat(n.depth), n.id))
            .collect();
        let reparsed = parse(&rendered, &schema);
        prop_assert_eq!(shape(&reparsed), shape(&forest));
    }

    #[test]
    fn fuzz_api_never_panics(text in ".{0,200}") {
        let _ = crate::fuzz::parse_all_presets(&text);
        let _ = crate::fuzz::parse_with_descriptor(&text, &text);
    }
}
