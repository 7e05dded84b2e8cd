//! Fuzz target for JSON rule file loading.
//!
//! Goal: loading arbitrary text as a rule file **never panics**. Invalid files are errors;
//! valid files compile into rules that evaluate without panicking.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_file
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use netguard_model::ConfigNode;
use netguard_rules::{RuleContext, load_rule_file};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(rules) = load_rule_file(text, &RuleContext::default()) else {
        return;
    };
    let node = ConfigNode::section(
        "interface GigabitEthernet0/1",
        vec![
            ConfigNode::command("switchport mode trunk"),
            ConfigNode::command("shutdown"),
        ],
    );
    for rule in &rules {
        let _ = rule.check(&node);
    }
});
