use anyhow::Context;
use netguard_domain::EngineReport;
use netguard_types::{
    NetguardData, NetguardReport, RuleResult, RunMeta, SCHEMA_REPORT_V1, Severity, SourceLoc,
    SourceMeta, ToolMeta, Verdict, VerdictCounts, VerdictStatus, VerdictSummary, ids,
};
use time::OffsetDateTime;

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "netguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub(crate) fn build_report(
    source: SourceMeta,
    profile: &str,
    rules_loaded: usize,
    engine: EngineReport,
    started_at: OffsetDateTime,
) -> NetguardReport {
    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;
    let results_emitted = engine.results_emitted();

    NetguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at,
            ended_at: Some(finished_at),
            duration_ms: Some(duration_ms),
        },
        source,
        verdict: VerdictSummary {
            status: engine.verdict.into(),
            counts: engine.counts,
            reasons: engine.reasons,
        },
        results: engine.results,
        data: NetguardData {
            profile: profile.to_string(),
            nodes_parsed: engine.nodes_evaluated,
            rules_loaded: rules_loaded as u32,
            results_total: engine.results_total,
            results_emitted,
            truncated_reason: engine.truncated_reason,
        },
    }
}

pub fn serialize_report(report: &NetguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<NetguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }
    serde_json::from_value(value).context("parse netguard report")
}

/// The verdict a report carries; `skip` never fails a run.
pub fn report_verdict(report: &NetguardReport) -> Verdict {
    match report.verdict.status {
        VerdictStatus::Fail => Verdict::Fail,
        VerdictStatus::Warn => Verdict::Warn,
        VerdictStatus::Pass | VerdictStatus::Skip => Verdict::Pass,
    }
}

/// A failing report describing a tool error, so consumers always get an envelope.
pub fn runtime_error_report(source: Option<&str>, message: &str) -> NetguardReport {
    let now = OffsetDateTime::now_utc();
    NetguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
        },
        source: SourceMeta {
            name: source.unwrap_or("unknown").to_string(),
            vendor: None,
        },
        verdict: VerdictSummary {
            status: VerdictStatus::Fail,
            counts: VerdictCounts {
                error: 1,
                ..VerdictCounts::default()
            },
            reasons: vec!["tool_error".to_string()],
        },
        results: vec![RuleResult {
            rule_id: ids::RULE_TOOL_RUNTIME.to_string(),
            node_id: String::new(),
            passed: false,
            level: Severity::Error,
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            loc: SourceLoc::default(),
            remediation: Some("Fix the tool error and re-run netguard.".to_string()),
            fingerprint: None,
        }],
        data: NetguardData {
            profile: "unknown".to_string(),
            results_total: 1,
            results_emitted: 1,
            ..NetguardData::default()
        },
    }
}
