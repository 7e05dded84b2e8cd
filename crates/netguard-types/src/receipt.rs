use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for netguard reports.
pub const SCHEMA_REPORT_V1: &str = "netguard.report.v1";

/// Rule level. Kept small so it maps cleanly to CI signals.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "unknown severity: {other} (expected info|warning|error)"
            )),
        }
    }
}

/// Position of a node in the source text.
///
/// Purely diagnostic: never used for matching.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
pub struct SourceLoc {
    /// 1-based line of the first physical line of the node.
    pub line: u32,
    /// 1-based column of the first non-blank character.
    pub col: u32,
    /// Byte offset of the start of the physical line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl SourceLoc {
    pub fn new(line: u32, col: u32) -> Self {
        Self {
            line,
            col,
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Outcome of one rule evaluated against one matching node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleResult {
    pub rule_id: String,
    pub node_id: String,
    pub passed: bool,
    pub level: Severity,
    /// `rule_passed`, `rule_failed` or `rule_error` (see [`crate::ids`]).
    pub code: String,
    pub message: String,
    pub loc: SourceLoc,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,

    /// Stable identifier intended for dedup and trending: a hash of
    /// `rule_id + node path + line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl RuleResult {
    pub fn is_error(&self) -> bool {
        self.code == crate::ids::CODE_RULE_ERROR
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl From<Verdict> for VerdictStatus {
    fn from(value: Verdict) -> Self {
        match value {
            Verdict::Pass => VerdictStatus::Pass,
            Verdict::Warn => VerdictStatus::Warn,
            Verdict::Fail => VerdictStatus::Fail,
        }
    }
}

/// Failed results by level, plus totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictCounts {
    pub passed: u32,
    pub info: u32,
    pub warning: u32,
    pub error: u32,
    /// Results produced by a check that errored (counted in the level buckets too).
    pub errored: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictSummary {
    pub status: VerdictStatus,
    pub counts: VerdictCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Which configuration the report covers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

/// Netguard-specific summary payload for the report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetguardData {
    pub profile: String,

    pub nodes_parsed: u32,
    pub rules_loaded: u32,

    pub results_total: u32,
    pub results_emitted: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,
}

/// A generic receipt/envelope.
///
/// Generic over the tool data so the outer shape stays stable while the payload evolves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = NetguardData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    pub source: SourceMeta,
    pub verdict: VerdictSummary,
    pub results: Vec<RuleResult>,
    pub data: TData,
}

pub type NetguardReport = ReportEnvelope<NetguardData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_info_warning_error() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_parses_aliases() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn source_loc_omits_missing_offset() {
        let loc = SourceLoc::new(3, 2);
        let json = serde_json::to_value(loc).expect("serialize loc");
        assert_eq!(json, serde_json::json!({ "line": 3, "col": 2 }));

        let with = SourceLoc::new(3, 2).with_offset(40);
        let json = serde_json::to_value(with).expect("serialize loc");
        assert_eq!(json["offset"], 40);
    }

    #[test]
    fn rule_result_skips_empty_optionals() {
        let result = RuleResult {
            rule_id: "r1".to_string(),
            node_id: "ntp server 10.0.0.1".to_string(),
            passed: true,
            level: Severity::Info,
            code: crate::ids::CODE_RULE_PASSED.to_string(),
            message: "ok".to_string(),
            loc: SourceLoc::new(1, 1),
            remediation: None,
            fingerprint: None,
        };
        let json = serde_json::to_value(&result).expect("serialize result");
        assert!(json.get("remediation").is_none());
        assert!(json.get("fingerprint").is_none());
        assert_eq!(json["level"], "info");
    }
}
