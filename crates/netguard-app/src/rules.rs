//! Loading and validating rule files handed in by the caller.

use anyhow::Context;
use netguard_domain::Rule;
use netguard_rules::{CompiledCheck, RuleContext, compile_rule_file, parse_rule_file};
use std::collections::BTreeMap;
use tracing::info;

/// One rule file: a display name (usually the path) and its contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSource {
    pub name: String,
    pub text: String,
}

impl RuleSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Load every rule file. Any invalid file, or a rule id defined twice across files, fails the
/// whole load.
pub fn load_rules(sources: &[RuleSource], ctx: &RuleContext) -> anyhow::Result<Vec<Rule>> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    let mut rules = Vec::new();
    for source in sources {
        let file = parse_rule_file(&source.text)
            .with_context(|| format!("load rules from {}", source.name))?;
        for rule in &file.rules {
            if let Some(first) = owners.insert(rule.id.clone(), &source.name) {
                anyhow::bail!(
                    "rule id `{}` is defined in both {first} and {}",
                    rule.id,
                    source.name
                );
            }
        }
        rules.extend(
            compile_rule_file(&file, ctx)
                .with_context(|| format!("compile rules from {}", source.name))?,
        );
    }
    info!(files = sources.len(), rules = rules.len(), "loaded rules");
    Ok(rules)
}

/// Validation outcome for one rule file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleFileReport {
    pub name: String,
    /// Rules in the file when it is valid.
    pub rules: Option<usize>,
    pub error: Option<String>,
    /// Non-fatal findings, such as patterns that never match.
    pub warnings: Vec<String>,
}

impl RuleFileReport {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidateOutput {
    pub files: Vec<RuleFileReport>,
}

impl ValidateOutput {
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(RuleFileReport::is_valid)
    }

    pub fn rule_count(&self) -> usize {
        self.files.iter().filter_map(|f| f.rules).sum()
    }
}

/// Validate rule files without running them. Every file is checked, even after a failure.
pub fn run_validate_rules(sources: &[RuleSource]) -> ValidateOutput {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    let files = sources
        .iter()
        .map(|source| {
            let mut report = RuleFileReport {
                name: source.name.clone(),
                rules: None,
                error: None,
                warnings: Vec::new(),
            };
            let file = match parse_rule_file(&source.text) {
                Ok(file) => file,
                Err(err) => {
                    report.error = Some(err.to_string());
                    return report;
                }
            };
            for rule in &file.rules {
                if let Some(first) = owners.insert(rule.id.clone(), source.name.clone()) {
                    report.error = Some(format!("rule id `{}` is also defined in {first}", rule.id));
                    return report;
                }
                for pattern in CompiledCheck::compile(&rule.check).invalid_patterns() {
                    report.warnings.push(format!(
                        "rule `{}`: pattern `{pattern}` does not compile and never matches",
                        rule.id
                    ));
                }
            }
            report.rules = Some(file.rules.len());
            report
        })
        .collect();
    ValidateOutput { files }
}
