use crate::selector::{Selector, VendorFilter};
use netguard_model::ConfigNode;
use netguard_types::Severity;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a check. The engine turns it into a failed `rule_error` result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{0}")]
    Failed(String),

    #[error("check panicked: {0}")]
    Panicked(String),
}

impl RuleError {
    pub fn failed(message: impl Into<String>) -> Self {
        RuleError::Failed(message.into())
    }
}

/// What a check decided for one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    /// Overrides the rule's default message.
    pub message: Option<String>,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            message: None,
        }
    }

    pub fn fail() -> Self {
        Self {
            passed: false,
            message: None,
        }
    }

    pub fn from_bool(passed: bool) -> Self {
        Self {
            passed,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Rule logic. Implementations must not mutate shared state; the engine may call a check on
/// any node, in any order.
pub trait RuleCheck: Send + Sync {
    fn check(&self, node: &ConfigNode) -> Result<CheckOutcome, RuleError>;
}

impl<F> RuleCheck for F
where
    F: Fn(&ConfigNode) -> Result<CheckOutcome, RuleError> + Send + Sync,
{
    fn check(&self, node: &ConfigNode) -> Result<CheckOutcome, RuleError> {
        self(node)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleMeta {
    pub level: Severity,
    /// Owning business unit.
    pub obu: String,
    pub owner: String,
    pub description: Option<String>,
    pub remediation: Option<String>,
}

/// A rule ready to run: selector, optional vendor filter, metadata and check.
#[derive(Clone)]
pub struct Rule {
    pub id: String,
    pub selector: Selector,
    pub vendor: Option<VendorFilter>,
    pub meta: RuleMeta,
    check: Arc<dyn RuleCheck>,
}

impl Rule {
    pub fn new(id: impl Into<String>, selector: Selector, check: impl RuleCheck + 'static) -> Self {
        Self::from_arc(id, selector, Arc::new(check))
    }

    pub fn from_arc(id: impl Into<String>, selector: Selector, check: Arc<dyn RuleCheck>) -> Self {
        Self {
            id: id.into(),
            selector,
            vendor: None,
            meta: RuleMeta::default(),
            check,
        }
    }

    pub fn with_vendor(mut self, vendor: VendorFilter) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn with_meta(mut self, meta: RuleMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.meta.level = level;
        self
    }

    /// Selector match on the node id, then the vendor filter when the node carries a vendor.
    pub fn applies_to(&self, node: &ConfigNode) -> bool {
        if !self.selector.matches(&node.id) {
            return false;
        }
        match (&self.vendor, node.vendor.as_deref()) {
            (Some(filter), Some(vendor)) => filter.matches(vendor),
            _ => true,
        }
    }

    pub fn check(&self, node: &ConfigNode) -> Result<CheckOutcome, RuleError> {
        self.check.check(node)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("selector", &self.selector.as_str())
            .field("vendor", &self.vendor.as_ref().map(VendorFilter::patterns))
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(passed: bool) -> impl Fn(&ConfigNode) -> Result<CheckOutcome, RuleError> {
        move |_: &ConfigNode| Ok(CheckOutcome::from_bool(passed))
    }

    #[test]
    fn vendor_filter_applies_only_to_stamped_nodes() {
        let rule = Rule::new("r", Selector::prefix("hostname"), always(true))
            .with_vendor(VendorFilter::new(["cisco-*"]).expect("filter"));

        let bare = ConfigNode::command("hostname r1");
        assert!(rule.applies_to(&bare));
        assert!(rule.applies_to(&bare.clone().with_vendor("cisco-ios")));
        assert!(!rule.applies_to(&bare.clone().with_vendor("juniper-junos")));
        assert!(!rule.applies_to(&ConfigNode::command("ntp server 1.1.1.1")));
    }

    #[test]
    fn closures_are_checks() {
        let rule = Rule::new("r", Selector::All, |node: &ConfigNode| -> Result<CheckOutcome, RuleError> {
            if node.id.contains("telnet") {
                Ok(CheckOutcome::fail().with_message("telnet enabled"))
            } else {
                Ok(CheckOutcome::pass())
            }
        });
        let outcome = rule
            .check(&ConfigNode::command("transport input telnet"))
            .expect("check");
        assert_eq!(outcome.message.as_deref(), Some("telnet enabled"));
        assert!(!outcome.passed);
    }
}
