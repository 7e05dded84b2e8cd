//! Fuzz target for the schema-aware configuration parser.
//!
//! Goal: parsing arbitrary text with every shipped preset **never panics**, and every node
//! sits exactly one level below its parent.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use netguard_model::ConfigNode;

fn check_depths(nodes: &[ConfigNode], depth: usize) {
    for node in nodes {
        assert_eq!(node.depth, depth, "node `{}` at wrong depth", node.id);
        check_depths(&node.children, depth + 1);
    }
}

fuzz_target!(|data: &[u8]| {
    // Keep inputs small so every preset runs quickly.
    if data.len() > 16 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = netguard_parser::fuzz::parse_all_presets(text);

    for name in netguard_parser::presets::available() {
        if let Some(forest) = netguard_parser::parse_with_preset(text, name) {
            check_depths(&forest, 0);
        }
    }
});
