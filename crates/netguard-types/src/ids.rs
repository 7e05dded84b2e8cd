//! Stable identifiers for result codes and tool-level diagnostics.
//!
//! Rule ids are user-defined; `code` is a short snake_case discriminator on every result.

// Codes: per-(rule, node) outcome
pub const CODE_RULE_PASSED: &str = "rule_passed";
pub const CODE_RULE_FAILED: &str = "rule_failed";
pub const CODE_RULE_ERROR: &str = "rule_error";

// Tool-level
pub const RULE_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

/// All codes a `RuleResult` may carry.
pub fn all_codes() -> &'static [&'static str] {
    &[
        CODE_RULE_PASSED,
        CODE_RULE_FAILED,
        CODE_RULE_ERROR,
        CODE_RUNTIME_ERROR,
    ]
}
