//! Embeddable netguard: parse device configurations, run rules over them, evaluate
//! expressions.
//!
//! ```
//! use netguard::{RuleContext, load_rule_file, parse_with_preset, run};
//!
//! let forest = parse_with_preset("interface Gi0/1\n shutdown\n", "cisco-ios").unwrap();
//! let rules = load_rule_file(
//!     r#"{"version": "1.0", "rules": [{
//!         "id": "no-shutdown", "selector": "interface",
//!         "metadata": {"level": "warning", "obu": "netops", "owner": "core"},
//!         "check": {"type": "child_not_exists", "selector": "shutdown"}}]}"#,
//!     &RuleContext::default(),
//! )
//! .unwrap();
//! let results = run(&forest, &rules);
//! assert!(!results[0].passed);
//! ```

#![forbid(unsafe_code)]

pub use netguard_domain::{
    CheckOutcome, EngineConfig, EngineReport, FailOn, Rule, RuleCheck, RuleError, RuleMeta,
    RulePolicy, Selector, SelectorError, VendorFilter, evaluate, run,
};
pub use netguard_expr::{EvalLimits, ExprError, ExprEvaluator};
pub use netguard_helpers::{HelperError, HelperRegistry, SharedRegistry, builtin};
pub use netguard_model::{ConfigNode, NodeKind, count_nodes, outline, preorder};
pub use netguard_parser::{
    BlockStyle, KeywordBlock, SchemaDescriptor, parse, parse_with_preset, presets,
};
pub use netguard_rules::{
    JsonCheck, JsonRule, JsonRuleFile, RuleContext, RuleFileError, compile_rule, load_rule_file,
    parse_rule_file,
};
pub use netguard_types::{RuleResult, Severity, SourceLoc, Verdict};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn custom_helpers_reach_expressions() {
        fn always_true<'a>(
            _args: &[netguard_helpers::HelperArg<'a>],
        ) -> Result<netguard_helpers::HelperValue<'a>, HelperError> {
            Ok(true.into())
        }

        let helpers = HelperRegistry::builder()
            .with_builtins()
            .vendor("lab", "alwaysTrue", always_true)
            .build();
        let evaluator = ExprEvaluator::new(Arc::new(helpers));
        let node = ConfigNode::command("hostname r1");
        assert!(evaluator.evaluate("lab.alwaysTrue()", &node));
        assert!(evaluator.evaluate(
            "paramCount(node) == 2 && startsWith(node, 'HOSTNAME')",
            &node
        ));
    }

    #[test]
    fn facade_round_trip() {
        let forest = parse_with_preset("system {\n    host-name fw-1;\n}\n", "junos")
            .expect("preset");
        assert_eq!(outline(&forest), "system/\n  host-name fw-1\n");
        assert_eq!(count_nodes(&forest), 2);
    }
}
