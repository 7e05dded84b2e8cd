use netguard_parser::SchemaDescriptor;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_CONFIG_V1: &str = "netguard.config.v1";

/// `netguard.toml` schema v1.
///
/// Every field is optional; absent values come from the profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetguardConfigV1 {
    /// Optional schema string for tooling (`netguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict`, `default` or `audit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Default schema for inputs: a preset name or a key of `schemas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// When to fail: `error`, `warning` or `never`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// How many results to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    /// Map of rule id -> override.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,

    /// Custom dialects, keyed by the name used in `vendor`.
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Override the rule's level: `info`, `warning`, `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Expression evaluator limits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluatorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expr_len: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_budget: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
}
