//! Declarative JSON rules.
//!
//! A rule file (`version = "1.0"`) is parsed and validated as a whole before any rule is used;
//! one malformed rule rejects the file. Valid rules compile into engine [`Rule`]s whose checks
//! evaluate a [`JsonCheck`] tree: structural predicates, helper calls and sandboxed
//! expressions. Evaluation never fails; anything that goes wrong evaluates to `false`.
//!
//! [`Rule`]: netguard_domain::Rule

#![forbid(unsafe_code)]

mod compile;
mod error;
mod load;
pub mod model;
mod validate;

#[cfg(test)]
mod proptest;

pub use compile::{CompiledCheck, Pattern, RuleContext, evaluate};
pub use error::RuleFileError;
pub use load::{JsonRuleCheck, compile_rule, compile_rule_file, load_rule_file};
pub use model::{
    HelperArgSpec, JsonCheck, JsonRule, JsonRuleFile, JsonRuleMetadata, NodeRef, NodeRefArg,
    RULE_FILE_VERSION, RuleFileMeta, SCHEMA_RULES_V1, VendorSpec,
};
pub use validate::{
    MAX_CHECK_DEPTH, MAX_OWNER_LEN, MAX_RULE_ID_LEN, is_json_rule, parse_rule_file,
    parse_rule_file_value, validate_rule,
};
