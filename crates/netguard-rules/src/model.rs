//! Serde model of a JSON rule file (`netguard.rules.v1`, version `"1.0"`).
//!
//! Every struct rejects unknown fields; [`JsonCheck`] is a closed union tagged by `type`.

use netguard_types::Severity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported `version` value.
pub const RULE_FILE_VERSION: &str = "1.0";

/// Stable schema identifier for rule files.
pub const SCHEMA_RULES_V1: &str = "netguard.rules.v1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JsonRuleFile {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RuleFileMeta>,
    pub rules: Vec<JsonRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleFileMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct JsonRule {
    pub id: String,
    /// Node selector; absent means every node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorSpec>,
    pub metadata: JsonRuleMetadata,
    pub check: JsonCheck,
    /// Message for failed results; `{nodeId}` and `{ruleId}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JsonRuleMetadata {
    pub level: Severity,
    /// Owning business unit.
    pub obu: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// One vendor pattern or several.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum VendorSpec {
    One(String),
    Many(Vec<String>),
}

impl VendorSpec {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            VendorSpec::One(p) => vec![p.as_str()],
            VendorSpec::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum JsonCheck {
    /// Regex on the node id.
    Match {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    NotMatch {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    /// Case-sensitive substring of the node id.
    Contains { text: String },
    NotContains { text: String },
    /// Some direct child id starts with `selector` (case-insensitive).
    ChildExists { selector: String },
    ChildNotExists { selector: String },
    ChildMatches {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    ChildContains {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        text: String,
    },
    Helper {
        helper: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<HelperArgSpec>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        negate: bool,
    },
    Expr { expr: String },
    And { conditions: Vec<JsonCheck> },
    Or { conditions: Vec<JsonCheck> },
    Not { condition: Box<JsonCheck> },
}

impl JsonCheck {
    pub fn kind(&self) -> &'static str {
        match self {
            JsonCheck::Match { .. } => "match",
            JsonCheck::NotMatch { .. } => "not_match",
            JsonCheck::Contains { .. } => "contains",
            JsonCheck::NotContains { .. } => "not_contains",
            JsonCheck::ChildExists { .. } => "child_exists",
            JsonCheck::ChildNotExists { .. } => "child_not_exists",
            JsonCheck::ChildMatches { .. } => "child_matches",
            JsonCheck::ChildContains { .. } => "child_contains",
            JsonCheck::Helper { .. } => "helper",
            JsonCheck::Expr { .. } => "expr",
            JsonCheck::And { .. } => "and",
            JsonCheck::Or { .. } => "or",
            JsonCheck::Not { .. } => "not",
        }
    }

    /// Nesting depth: 1 for a leaf.
    pub fn depth(&self) -> usize {
        match self {
            JsonCheck::And { conditions } | JsonCheck::Or { conditions } => {
                1 + conditions.iter().map(JsonCheck::depth).max().unwrap_or(0)
            }
            JsonCheck::Not { condition } => 1 + condition.depth(),
            _ => 1,
        }
    }
}

/// A helper argument: a literal or a reference to the node under evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HelperArgSpec {
    Ref(NodeRefArg),
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<HelperArgSpec>),
    Null,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NodeRefArg {
    #[serde(rename = "$ref")]
    pub target: NodeRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum NodeRef {
    #[serde(rename = "node")]
    Node,
    #[serde(rename = "node.id")]
    Id,
    #[serde(rename = "node.type")]
    Type,
    #[serde(rename = "node.children")]
    Children,
    #[serde(rename = "node.params")]
    Params,
    #[serde(rename = "node.rawText")]
    RawText,
}
