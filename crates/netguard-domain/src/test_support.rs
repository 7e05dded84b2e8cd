use crate::rule::{CheckOutcome, Rule, RuleCheck, RuleError};
use crate::selector::Selector;
use netguard_model::ConfigNode;

/// `interface GigabitEthernet0/1` (one trunk child) followed by `hostname edge1`.
pub fn cisco_trunk() -> Vec<ConfigNode> {
    vec![
        ConfigNode::section(
            "interface GigabitEthernet0/1",
            vec![ConfigNode::command("switchport mode trunk").at(2, 2)],
        )
        .at(1, 1)
        .with_vendor("cisco-ios"),
        ConfigNode::command("hostname edge1")
            .at(3, 1)
            .with_vendor("cisco-ios"),
    ]
}

pub fn rule(id: &str, selector: &str, check: impl RuleCheck + 'static) -> Rule {
    Rule::new(id, Selector::parse(selector).expect("selector"), check)
}

pub fn always(passed: bool) -> impl Fn(&ConfigNode) -> Result<CheckOutcome, RuleError> {
    move |_: &ConfigNode| Ok(CheckOutcome::from_bool(passed))
}

pub fn panicking() -> impl Fn(&ConfigNode) -> Result<CheckOutcome, RuleError> {
    |node: &ConfigNode| -> Result<CheckOutcome, RuleError> { panic!("cannot check {}", node.id) }
}
