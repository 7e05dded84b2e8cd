use crate::fingerprint::fingerprint_for_result;
use crate::policy::{EngineConfig, FailOn};
use crate::report::{EngineReport, count_results};
use crate::rule::{CheckOutcome, Rule, RuleError};
use netguard_model::{ConfigNode, count_nodes};
use netguard_types::{RuleResult, Verdict, VerdictCounts, ids};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, trace};

/// Run every rule against every node, pre-order, and collect one result per
/// (rule, matching node).
///
/// Results come in traversal order, then rule order. A check that returns an error or panics
/// yields a failed `rule_error` result; the run always continues.
pub fn run(forest: &[ConfigNode], rules: &[Rule]) -> Vec<RuleResult> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    visit(forest, rules, &mut path, &mut out);
    out
}

fn visit<'a>(
    nodes: &'a [ConfigNode],
    rules: &[Rule],
    path: &mut Vec<&'a str>,
    out: &mut Vec<RuleResult>,
) {
    for node in nodes {
        path.push(node.id.as_str());
        for rule in rules {
            if rule.applies_to(node) {
                trace!(rule = %rule.id, node = %node.id, line = node.loc.line, "rule matched");
                out.push(apply(rule, node, path));
            }
        }
        visit(&node.children, rules, path, out);
        path.pop();
    }
}

fn apply(rule: &Rule, node: &ConfigNode, path: &[&str]) -> RuleResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| rule.check(node)))
        .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

    let (passed, code, message) = match outcome {
        Ok(CheckOutcome { passed, message }) => {
            let code = if passed {
                ids::CODE_RULE_PASSED
            } else {
                ids::CODE_RULE_FAILED
            };
            let message = message.unwrap_or_else(|| default_message(rule, passed));
            (passed, code, message)
        }
        Err(err) => {
            debug!(rule = %rule.id, node = %node.id, error = %err, "rule check errored");
            (false, ids::CODE_RULE_ERROR, format!("rule error: {err}"))
        }
    };

    RuleResult {
        rule_id: rule.id.clone(),
        node_id: node.id.clone(),
        passed,
        level: rule.meta.level,
        code: code.to_string(),
        message,
        loc: node.loc,
        remediation: if passed {
            None
        } else {
            rule.meta.remediation.clone()
        },
        fingerprint: Some(fingerprint_for_result(&rule.id, path, node.loc.line)),
    }
}

fn default_message(rule: &Rule, passed: bool) -> String {
    match (&rule.meta.description, passed) {
        (_, true) => format!("rule {} passed", rule.id),
        (Some(description), false) => description.clone(),
        (None, false) => format!("rule {} failed", rule.id),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// [`run`] under policy: disabled rules are skipped, level overrides applied, results
/// optionally truncated (always with a reason), and a verdict computed.
pub fn evaluate(forest: &[ConfigNode], rules: &[Rule], cfg: &EngineConfig) -> EngineReport {
    let effective: Vec<Rule> = rules
        .iter()
        .filter(|rule| cfg.is_enabled(&rule.id))
        .map(|rule| match cfg.rule_policy(&rule.id).and_then(|p| p.level) {
            Some(level) => rule.clone().with_level(level),
            None => rule.clone(),
        })
        .collect();

    let mut results = run(forest, &effective);
    let total = results.len() as u32;
    let counts = count_results(&results);
    let (verdict, reasons) = compute_verdict(&counts, cfg.fail_on);

    let mut truncated_reason = None;
    if let Some(max) = cfg.max_results
        && results.len() > max
    {
        results.truncate(max);
        truncated_reason = Some(format!("results truncated to max_results={max}"));
    }

    EngineReport {
        verdict,
        counts,
        reasons,
        results,
        nodes_evaluated: count_nodes(forest) as u32,
        rules_evaluated: effective.len() as u32,
        results_total: total,
        truncated_reason,
    }
}

fn compute_verdict(counts: &VerdictCounts, fail_on: FailOn) -> (Verdict, Vec<String>) {
    let mut reasons = Vec::new();
    if counts.error > 0 {
        reasons.push(format!("{} error-level rule failure(s)", counts.error));
    }
    if counts.warning > 0 {
        reasons.push(format!("{} warning-level rule failure(s)", counts.warning));
    }
    if counts.errored > 0 {
        reasons.push(format!("{} rule check(s) errored", counts.errored));
    }

    let verdict = match fail_on {
        FailOn::Error if counts.error > 0 => Verdict::Fail,
        FailOn::Warning if counts.error + counts.warning > 0 => Verdict::Fail,
        _ if counts.error + counts.warning > 0 => Verdict::Warn,
        _ => Verdict::Pass,
    };
    (verdict, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RulePolicy;
    use crate::selector::Selector;
    use crate::test_support::{always, cisco_trunk, panicking, rule};
    use netguard_types::Severity;

    #[test]
    fn failing_trunk_rule_reports_the_child() {
        let forest = cisco_trunk();
        let rules = [rule("no-trunk", "switchport mode trunk", always(false))];
        let results = run(&forest, &rules);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert_eq!(results[0].node_id, "switchport mode trunk");
        assert_eq!(results[0].code, ids::CODE_RULE_FAILED);
        assert_eq!(results[0].loc.line, 2);
    }

    #[test]
    fn results_follow_traversal_then_rule_order() {
        let forest = cisco_trunk();
        let rules = [
            rule("b", "*", always(true)),
            rule("a", "interface", always(true)),
        ];
        let order: Vec<(String, String)> = run(&forest, &rules)
            .into_iter()
            .map(|r| (r.node_id, r.rule_id))
            .collect();
        assert_eq!(
            order,
            vec![
                ("interface GigabitEthernet0/1".to_string(), "b".to_string()),
                ("interface GigabitEthernet0/1".to_string(), "a".to_string()),
                ("switchport mode trunk".to_string(), "b".to_string()),
                ("hostname edge1".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn errors_and_panics_become_failed_results() {
        let forest = cisco_trunk();
        let rules = [
            rule("boom", "*", panicking()),
            rule("err", "hostname", |_: &ConfigNode| -> Result<CheckOutcome, RuleError> {
                Err(RuleError::failed("helper unavailable"))
            }),
            rule("ok", "*", always(true)),
        ];
        let results = run(&forest, &rules);
        assert_eq!(results.len(), 7);

        let boom: Vec<_> = results.iter().filter(|r| r.rule_id == "boom").collect();
        assert_eq!(boom.len(), 3);
        assert!(boom.iter().all(|r| !r.passed && r.is_error()));
        assert!(boom[0].message.contains("check panicked"));

        let err = results.iter().find(|r| r.rule_id == "err").expect("err result");
        assert_eq!(err.message, "rule error: helper unavailable");
        assert_eq!(results.iter().filter(|r| r.rule_id == "ok" && r.passed).count(), 3);
    }

    #[test]
    fn messages_and_remediation() {
        let forest = cisco_trunk();
        let mut failing = rule("desc", "hostname", always(false));
        failing.meta.description = Some("hostname must follow the naming standard".to_string());
        failing.meta.remediation = Some("rename the device".to_string());
        let passing = rule("p", "hostname", always(true));

        let results = run(&forest, &[failing.clone(), passing]);
        assert_eq!(results[0].message, "hostname must follow the naming standard");
        assert_eq!(results[0].remediation.as_deref(), Some("rename the device"));
        assert_eq!(results[1].message, "rule p passed");
        assert_eq!(results[1].remediation, None);

        let custom = Rule::new("c", Selector::All, |_: &ConfigNode| -> Result<CheckOutcome, RuleError> {
            Ok(CheckOutcome::fail().with_message("custom"))
        });
        assert_eq!(run(&forest, &[custom])[0].message, "custom");
    }

    #[test]
    fn fingerprints_differ_per_node() {
        let forest = cisco_trunk();
        let results = run(&forest, &[rule("all", "*", always(true))]);
        let mut prints: Vec<_> = results.iter().filter_map(|r| r.fingerprint.clone()).collect();
        prints.sort();
        prints.dedup();
        assert_eq!(prints.len(), 3);
    }

    #[test]
    fn policy_overrides_and_verdicts() {
        let forest = cisco_trunk();
        let rules = [
            rule("trunk", "switchport", always(false)).with_level(Severity::Error),
            rule("host", "hostname", always(false)).with_level(Severity::Warning),
        ];

        let report = evaluate(&forest, &rules, &EngineConfig::default());
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.counts.error, 1);
        assert_eq!(report.counts.warning, 1);
        assert_eq!(report.nodes_evaluated, 3);
        assert_eq!(report.rules_evaluated, 2);

        let mut cfg = EngineConfig::default();
        cfg.rules
            .insert("trunk".to_string(), RulePolicy::with_level(Severity::Warning));
        assert_eq!(evaluate(&forest, &rules, &cfg).verdict, Verdict::Warn);

        cfg.fail_on = FailOn::Warning;
        assert_eq!(evaluate(&forest, &rules, &cfg).verdict, Verdict::Fail);

        cfg.fail_on = FailOn::Never;
        cfg.rules.insert("trunk".to_string(), RulePolicy::with_level(Severity::Error));
        let report = evaluate(&forest, &rules, &cfg);
        assert_eq!(report.verdict, Verdict::Warn);
        assert!(!report.reasons.is_empty());

        cfg.rules.insert("trunk".to_string(), RulePolicy::disabled());
        cfg.rules.insert("host".to_string(), RulePolicy::disabled());
        let report = evaluate(&forest, &rules, &cfg);
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.rules_evaluated, 0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn truncation_is_explained_and_keeps_counts() {
        let forest = cisco_trunk();
        let rules = [rule("all", "*", always(false)).with_level(Severity::Error)];
        let cfg = EngineConfig {
            max_results: Some(1),
            ..EngineConfig::default()
        };
        let report = evaluate(&forest, &rules, &cfg);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results_total, 3);
        assert_eq!(report.results_emitted(), 1);
        assert_eq!(report.counts.error, 3);
        assert_eq!(
            report.truncated_reason.as_deref(),
            Some("results truncated to max_results=1")
        );
    }
}
