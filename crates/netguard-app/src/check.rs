//! The `check` use case: parse configurations, evaluate rules and produce reports.

use crate::report::{build_report, report_verdict};
use crate::rules::{RuleSource, load_rules};
use anyhow::Context;
use netguard_domain::Rule;
use netguard_expr::{EvalLimits, ExprEvaluator};
use netguard_helpers::{SharedRegistry, builtin};
use netguard_rules::RuleContext;
use netguard_settings::{NetguardConfigV1, Overrides, ResolvedConfig};
use netguard_types::{NetguardReport, SourceMeta, Verdict};
use rayon::prelude::*;
use std::sync::{Arc, LazyLock};
use time::OffsetDateTime;
use tracing::info;

static HELPERS: LazyLock<SharedRegistry> = LazyLock::new(SharedRegistry::default);

/// Parse and resolve `netguard.toml` contents; empty text means defaults.
pub(crate) fn resolve(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        NetguardConfigV1::default()
    } else {
        netguard_settings::parse_config_toml(config_text).context("parse config")?
    };
    netguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

/// Evaluation context over the process-wide built-in helpers.
pub(crate) fn rule_context(limits: &EvalLimits) -> RuleContext {
    let helpers = HELPERS.get_or_build(builtin);
    RuleContext::new(Arc::new(ExprEvaluator::with_limits(helpers, limits.clone())))
}

/// One configuration to check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInput {
    /// Display name (usually the path).
    pub name: String,
    pub text: String,
    /// Schema for this input; falls back to the configured vendor.
    pub vendor: Option<String>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            vendor: None,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
}

/// Resolved settings and compiled rules, shared by every input of a run.
#[derive(Debug)]
pub struct CheckSession {
    resolved: ResolvedConfig,
    rules: Vec<Rule>,
}

impl CheckSession {
    pub fn prepare(
        config_text: &str,
        overrides: Overrides,
        rules: &[RuleSource],
    ) -> anyhow::Result<Self> {
        let resolved = resolve(config_text, overrides)?;
        let ctx = rule_context(&resolved.limits);
        let rules = load_rules(rules, &ctx)?;
        Ok(Self { resolved, rules })
    }

    pub fn resolved_config(&self) -> &ResolvedConfig {
        &self.resolved
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Parse one input and evaluate every rule against it.
    pub fn check(&self, source: &SourceInput) -> anyhow::Result<NetguardReport> {
        let started_at = OffsetDateTime::now_utc();
        let schema = self
            .resolved
            .schema_for(source.vendor.as_deref())
            .with_context(|| format!("select schema for {}", source.name))?;

        let forest = netguard_parser::parse(&source.text, &schema);
        let engine = netguard_domain::evaluate(&forest, &self.rules, &self.resolved.engine);
        info!(
            source = %source.name,
            vendor = %schema.vendor,
            nodes = engine.nodes_evaluated,
            results = engine.results_total,
            verdict = ?engine.verdict,
            "checked configuration"
        );

        Ok(build_report(
            SourceMeta {
                name: source.name.clone(),
                vendor: Some(schema.vendor),
            },
            &self.resolved.engine.profile,
            self.rules.len(),
            engine,
            started_at,
        ))
    }
}

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    pub rules: &'a [RuleSource],
    pub source: &'a SourceInput,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: NetguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: resolve config, load rules, parse the input, evaluate, report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let session = CheckSession::prepare(input.config_text, input.overrides, input.rules)?;
    let report = session.check(input.source)?;
    Ok(CheckOutput {
        report,
        resolved_config: session.resolved,
    })
}

#[derive(Clone, Debug)]
pub struct BatchInput<'a> {
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub rules: &'a [RuleSource],
    pub sources: &'a [SourceInput],
}

#[derive(Clone, Debug)]
pub struct BatchOutput {
    /// One report per input, in input order.
    pub reports: Vec<NetguardReport>,
    /// The worst verdict across all reports.
    pub verdict: Verdict,
    pub resolved_config: ResolvedConfig,
}

/// Check many inputs in parallel with shared settings and rules.
pub fn run_batch(input: BatchInput<'_>) -> anyhow::Result<BatchOutput> {
    let session = CheckSession::prepare(input.config_text, input.overrides, input.rules)?;
    let reports = input
        .sources
        .par_iter()
        .map(|source| session.check(source))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let verdict = reports
        .iter()
        .map(report_verdict)
        .fold(Verdict::Pass, worse);
    Ok(BatchOutput {
        reports,
        verdict,
        resolved_config: session.resolved,
    })
}

fn worse(a: Verdict, b: Verdict) -> Verdict {
    match (a, b) {
        (Verdict::Fail, _) | (_, Verdict::Fail) => Verdict::Fail,
        (Verdict::Warn, _) | (_, Verdict::Warn) => Verdict::Warn,
        _ => Verdict::Pass,
    }
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_types::{VerdictStatus, ids};

    const CISCO: &str = "\
hostname edge-1
!
interface GigabitEthernet0/1
 switchport mode trunk
!
interface GigabitEthernet0/2
 switchport mode trunk
 switchport nonegotiate
";

    const RULES: &str = r#"{
        "version": "1.0",
        "rules": [{
            "id": "trunk-nonegotiate",
            "selector": "interface",
            "metadata": {"level": "error", "obu": "netops", "owner": "switching",
                         "remediation": "add switchport nonegotiate"},
            "check": {"type": "or", "conditions": [
                {"type": "child_not_exists", "selector": "switchport mode trunk"},
                {"type": "child_exists", "selector": "switchport nonegotiate"}
            ]}
        }]
    }"#;

    fn rules() -> Vec<RuleSource> {
        vec![RuleSource::new("trunk.json", RULES)]
    }

    #[test]
    fn check_produces_a_failing_report() {
        let rules = rules();
        let source = SourceInput::new("edge-1.cfg", CISCO).with_vendor("cisco");
        let output = run_check(CheckInput {
            config_text: "",
            overrides: Overrides::default(),
            rules: &rules,
            source: &source,
        })
        .expect("run_check");

        let report = output.report;
        assert_eq!(output.resolved_config.engine.profile, "default");
        assert_eq!(report.source.vendor.as_deref(), Some("cisco-ios"));
        assert_eq!(report.verdict.status, VerdictStatus::Fail);
        assert_eq!(report.verdict.counts.error, 1);
        assert_eq!(report.verdict.counts.passed, 1);
        assert_eq!(report.data.nodes_parsed, 6);
        assert_eq!(report.data.rules_loaded, 1);
        assert_eq!(report.results.len(), 2);

        let failed = &report.results[0];
        assert_eq!(failed.node_id, "interface GigabitEthernet0/1");
        assert_eq!(failed.code, ids::CODE_RULE_FAILED);
        assert_eq!(failed.loc.line, 3);
        assert_eq!(failed.remediation.as_deref(), Some("add switchport nonegotiate"));
    }

    #[test]
    fn config_controls_policy() {
        let rules = rules();
        let source = SourceInput::new("edge-1.cfg", CISCO);
        let output = run_check(CheckInput {
            config_text: "profile = \"audit\"\nvendor = \"cisco-ios\"\nmax_results = 1",
            overrides: Overrides::default(),
            rules: &rules,
            source: &source,
        })
        .expect("run_check");
        let report = output.report;
        assert_eq!(report.verdict.status, VerdictStatus::Warn);
        assert_eq!(report.data.results_total, 2);
        assert_eq!(report.data.results_emitted, 1);
        assert!(report.data.truncated_reason.is_some());
    }

    #[test]
    fn missing_vendor_is_an_error() {
        let rules = rules();
        let source = SourceInput::new("edge-1.cfg", CISCO);
        let err = run_check(CheckInput {
            config_text: "",
            overrides: Overrides::default(),
            rules: &rules,
            source: &source,
        })
        .expect_err("no vendor");
        assert!(format!("{err:#}").contains("no vendor given"), "{err:#}");
    }

    #[test]
    fn batch_keeps_input_order_and_worst_verdict() {
        let rules = rules();
        let clean = CISCO.replace(
            "interface GigabitEthernet0/1\n switchport mode trunk\n",
            "interface GigabitEthernet0/1\n switchport mode access\n",
        );
        let sources = [
            SourceInput::new("clean.cfg", clean),
            SourceInput::new("dirty.cfg", CISCO),
            SourceInput::new("empty.cfg", ""),
        ];
        let output = run_batch(BatchInput {
            config_text: "vendor = \"cisco-ios\"",
            overrides: Overrides::default(),
            rules: &rules,
            sources: &sources,
        })
        .expect("run_batch");

        let names: Vec<&str> = output.reports.iter().map(|r| r.source.name.as_str()).collect();
        assert_eq!(names, vec!["clean.cfg", "dirty.cfg", "empty.cfg"]);
        assert_eq!(output.reports[0].verdict.status, VerdictStatus::Pass);
        assert_eq!(output.reports[2].data.nodes_parsed, 0);
        assert_eq!(output.verdict, Verdict::Fail);
        assert_eq!(verdict_exit_code(output.verdict), 2);
    }

    #[test]
    fn verdict_exit_codes() {
        assert_eq!(verdict_exit_code(Verdict::Pass), 0);
        assert_eq!(verdict_exit_code(Verdict::Warn), 0);
        assert_eq!(verdict_exit_code(Verdict::Fail), 2);
    }
}
