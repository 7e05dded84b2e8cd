use netguard_types::Severity;
use std::collections::BTreeMap;

/// Lowest failed level that turns the verdict into `fail`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
    /// Failures only ever produce `warn`.
    Never,
}

/// Per-rule override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulePolicy {
    pub enabled: bool,
    pub level: Option<Severity>,
}

impl RulePolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            level: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            level: None,
        }
    }

    pub fn with_level(level: Severity) -> Self {
        Self {
            enabled: true,
            level: Some(level),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub profile: String,
    pub fail_on: FailOn,
    /// `None` keeps every result.
    pub max_results: Option<usize>,
    pub rules: BTreeMap<String, RulePolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            fail_on: FailOn::Error,
            max_results: None,
            rules: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Rules without an override are enabled at their own level.
    pub fn rule_policy(&self, rule_id: &str) -> Option<&RulePolicy> {
        self.rules.get(rule_id)
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rule_policy(rule_id).is_none_or(|p| p.enabled)
    }
}
