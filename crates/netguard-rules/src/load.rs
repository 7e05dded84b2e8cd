use crate::RuleFileError;
use crate::compile::{CompiledCheck, RuleContext};
use crate::model::{JsonRule, JsonRuleFile};
use crate::validate::{parse_rule_file, validate_rule};
use netguard_domain::{CheckOutcome, Rule, RuleCheck, RuleError, RuleMeta, Selector, VendorFilter};
use netguard_model::ConfigNode;
use netguard_parser::presets;
use std::sync::Arc;
use tracing::{info, warn};

/// A JSON rule's check bound to an evaluation context.
#[derive(Debug)]
pub struct JsonRuleCheck {
    rule_id: String,
    check: CompiledCheck,
    ctx: RuleContext,
    failure_message: Option<String>,
    success_message: Option<String>,
}

impl JsonRuleCheck {
    pub fn new(rule: &JsonRule, ctx: RuleContext) -> Self {
        Self {
            rule_id: rule.id.clone(),
            check: CompiledCheck::compile(&rule.check),
            ctx,
            failure_message: rule.failure_message.clone(),
            success_message: rule.success_message.clone(),
        }
    }

    fn message(&self, passed: bool, node: &ConfigNode) -> Option<String> {
        let template = if passed {
            self.success_message.as_deref()
        } else {
            self.failure_message.as_deref()
        }?;
        Some(
            template
                .replace("{nodeId}", &node.id)
                .replace("{ruleId}", &self.rule_id),
        )
    }
}

impl RuleCheck for JsonRuleCheck {
    fn check(&self, node: &ConfigNode) -> Result<CheckOutcome, RuleError> {
        let passed = self.check.evaluate(node, &self.ctx);
        let outcome = CheckOutcome::from_bool(passed);
        Ok(match self.message(passed, node) {
            Some(message) => outcome.with_message(message),
            None => outcome,
        })
    }
}

/// Validate one rule and turn it into an engine [`Rule`].
pub fn compile_rule(rule: &JsonRule, ctx: &RuleContext) -> Result<Rule, RuleFileError> {
    validate_rule(rule)?;
    let label = format!("`{}`", rule.id);

    let selector = match &rule.selector {
        Some(text) => Selector::parse(text)
            .map_err(|e| RuleFileError::field(&label, "selector", e.to_string()))?,
        None => Selector::All,
    };

    let check = JsonRuleCheck::new(rule, ctx.clone());
    for pattern in check.check.invalid_patterns() {
        warn!(rule = %rule.id, pattern, "rule pattern does not compile and will never match");
    }

    let mut compiled = Rule::from_arc(rule.id.clone(), selector, Arc::new(check)).with_meta(
        RuleMeta {
            level: rule.metadata.level,
            obu: rule.metadata.obu.clone(),
            owner: rule.metadata.owner.clone(),
            description: rule.metadata.description.clone(),
            remediation: rule.metadata.remediation.clone(),
        },
    );
    if let Some(vendor) = &rule.vendor {
        let filter = VendorFilter::new(vendor.patterns().into_iter().map(vendor_pattern))
            .map_err(|e| RuleFileError::field(&label, "vendor", e.to_string()))?;
        compiled = compiled.with_vendor(filter);
    }
    Ok(compiled)
}

/// Preset aliases (`cisco`, `junos`) name the canonical vendor the parser stamps on nodes.
/// Globs and unknown names, such as custom dialects, are kept as written.
fn vendor_pattern<S: AsRef<str>>(pattern: S) -> String {
    let pattern = pattern.as_ref().trim();
    if pattern.contains(['*', '?', '[', '{']) {
        return pattern.to_string();
    }
    presets::canonical_name(pattern)
        .map(str::to_string)
        .unwrap_or_else(|| pattern.to_string())
}

/// Compile every rule of an already-parsed file.
pub fn compile_rule_file(file: &JsonRuleFile, ctx: &RuleContext) -> Result<Vec<Rule>, RuleFileError> {
    file.rules.iter().map(|rule| compile_rule(rule, ctx)).collect()
}

/// Parse, validate and compile a rule file. Nothing is returned unless every rule is valid.
pub fn load_rule_file(text: &str, ctx: &RuleContext) -> Result<Vec<Rule>, RuleFileError> {
    let file = parse_rule_file(text)?;
    let rules = compile_rule_file(&file, ctx)?;
    info!(
        name = file.meta.as_ref().and_then(|m| m.name.as_deref()).unwrap_or("<unnamed>"),
        rules = rules.len(),
        "loaded rule file"
    );
    Ok(rules)
}
