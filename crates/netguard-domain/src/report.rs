use netguard_types::{RuleResult, Severity, Verdict, VerdictCounts};

/// Tally results: passes, failures by level, and check errors.
pub fn count_results(results: &[RuleResult]) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for r in results {
        if r.passed {
            counts.passed += 1;
            continue;
        }
        match r.level {
            Severity::Info => counts.info += 1,
            Severity::Warning => counts.warning += 1,
            Severity::Error => counts.error += 1,
        }
        if r.is_error() {
            counts.errored += 1;
        }
    }
    counts
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineReport {
    pub verdict: Verdict,
    /// Counts over every result, including any cut by truncation.
    pub counts: VerdictCounts,
    /// Human-readable reasons behind the verdict.
    pub reasons: Vec<String>,
    pub results: Vec<RuleResult>,
    pub nodes_evaluated: u32,
    pub rules_evaluated: u32,
    pub results_total: u32,
    pub truncated_reason: Option<String>,
}

impl EngineReport {
    pub fn results_emitted(&self) -> u32 {
        self.results.len() as u32
    }
}
