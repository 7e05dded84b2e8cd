//! Pure rule evaluation (no IO).
//!
//! Input: a parsed config forest and compiled rules.
//! Output: one result per (rule, matching node), plus verdict and summary data.

#![forbid(unsafe_code)]

pub mod fingerprint;
pub mod policy;
pub mod report;
pub mod rule;
pub mod selector;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{evaluate, run};
pub use policy::{EngineConfig, FailOn, RulePolicy};
pub use report::EngineReport;
pub use rule::{CheckOutcome, Rule, RuleCheck, RuleError, RuleMeta};
pub use selector::{Selector, SelectorError, VendorFilter};
