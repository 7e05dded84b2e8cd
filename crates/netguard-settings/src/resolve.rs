use crate::model::{EvaluatorConfig, NetguardConfigV1, SCHEMA_CONFIG_V1};
use crate::presets;
use anyhow::Context;
use netguard_domain::{EngineConfig, FailOn, RulePolicy};
use netguard_expr::EvalLimits;
use netguard_parser::{SchemaDescriptor, presets as parser_presets};
use netguard_types::Severity;
use std::collections::BTreeMap;
use std::time::Duration;

/// Command-line values; each wins over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub vendor: Option<String>,
    pub max_results: Option<u32>,
    pub fail_on: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub engine: EngineConfig,
    pub limits: EvalLimits,
    /// Default schema name for inputs.
    pub vendor: Option<String>,
    /// Custom dialects from the file.
    pub schemas: BTreeMap<String, SchemaDescriptor>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            limits: EvalLimits::default(),
            vendor: None,
            schemas: BTreeMap::new(),
        }
    }
}

impl ResolvedConfig {
    /// Schema for `name`, or for the configured default vendor when `name` is `None`.
    ///
    /// Custom schemas shadow presets of the same name.
    pub fn schema_for(&self, name: Option<&str>) -> anyhow::Result<SchemaDescriptor> {
        let name = name
            .or(self.vendor.as_deref())
            .context("no vendor given (use --vendor or set `vendor` in netguard.toml)")?;
        lookup_schema(&self.schemas, name)
    }
}

fn lookup_schema(
    custom: &BTreeMap<String, SchemaDescriptor>,
    name: &str,
) -> anyhow::Result<SchemaDescriptor> {
    if let Some(schema) = custom.get(name) {
        return Ok(schema.clone());
    }
    parser_presets::lookup(name).with_context(|| {
        format!(
            "unknown vendor: {name} (expected one of {} or a [schemas] entry)",
            parser_presets::available().join(", ")
        )
    })
}

pub fn resolve_config(
    cfg: NetguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "default".to_string());
    let mut engine = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected {})",
            presets::PROFILES.join("|")
        )
    })?;

    if let Some(fail_on) = overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        engine.fail_on = parse_fail_on(fail_on)?;
    }

    if let Some(max) = overrides.max_results.or(cfg.max_results) {
        engine.max_results = Some(max as usize);
    }

    // per-rule overrides
    for (rule_id, rc) in &cfg.rules {
        let mut policy = RulePolicy::enabled();
        if let Some(enabled) = rc.enabled {
            policy.enabled = enabled;
        }
        if let Some(level) = rc.level.as_deref() {
            policy.level = Some(
                level
                    .parse::<Severity>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("invalid level for rule {rule_id}"))?,
            );
        }
        engine.rules.insert(rule_id.clone(), policy);
    }

    let limits = resolve_limits(&cfg.evaluator)?;

    let vendor = overrides.vendor.or(cfg.vendor);
    if let Some(name) = vendor.as_deref() {
        lookup_schema(&cfg.schemas, name)?;
    }

    Ok(ResolvedConfig {
        engine,
        limits,
        vendor,
        schemas: cfg.schemas,
    })
}

fn resolve_limits(cfg: &EvaluatorConfig) -> anyhow::Result<EvalLimits> {
    let mut limits = EvalLimits::default();
    if let Some(max) = cfg.max_expr_len {
        anyhow::ensure!(max > 0, "evaluator.max_expr_len must be positive");
        limits.max_len = max;
    }
    if let Some(budget) = cfg.step_budget {
        anyhow::ensure!(budget > 0, "evaluator.step_budget must be positive");
        limits.step_budget = budget;
    }
    if let Some(ms) = cfg.timeout_ms {
        anyhow::ensure!(ms > 0, "evaluator.timeout_ms must be positive");
        limits.timeout = Duration::from_millis(ms);
    }
    if let Some(capacity) = cfg.cache_capacity {
        limits.cache_capacity = capacity;
    }
    Ok(limits)
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        "never" => Ok(FailOn::Never),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning|never)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;
    use netguard_parser::BlockStyle;

    fn resolve(toml: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
        resolve_config(parse_config_toml(toml)?, overrides)
    }

    #[test]
    fn empty_config_uses_the_default_profile() {
        let resolved = resolve("", Overrides::default()).expect("resolve");
        assert_eq!(resolved.engine.profile, "default");
        assert_eq!(resolved.engine.fail_on, FailOn::Error);
        assert_eq!(resolved.engine.max_results, Some(5000));
        assert_eq!(resolved.limits, EvalLimits::default());
        assert!(resolved.vendor.is_none());
    }

    #[test]
    fn profiles_set_fail_on() {
        for (profile, fail_on) in [
            ("strict", FailOn::Warning),
            ("default", FailOn::Error),
            ("audit", FailOn::Never),
        ] {
            let resolved = resolve(&format!("profile = \"{profile}\""), Overrides::default())
                .expect("resolve");
            assert_eq!(resolved.engine.fail_on, fail_on, "{profile}");
        }
    }

    #[test]
    fn full_config_is_applied() {
        let resolved = resolve(
            r#"
schema = "netguard.config.v1"
profile = "strict"
vendor = "junos"
fail_on = "never"
max_results = 10

[evaluator]
max_expr_len = 200
step_budget = 500
timeout_ms = 5
cache_capacity = 0

[rules."ntp-configured"]
enabled = false

[rules."trunk-nonegotiate"]
level = "warn"
"#,
            Overrides::default(),
        )
        .expect("resolve");

        assert_eq!(resolved.engine.profile, "strict");
        assert_eq!(resolved.engine.fail_on, FailOn::Never);
        assert_eq!(resolved.engine.max_results, Some(10));
        assert!(!resolved.engine.is_enabled("ntp-configured"));
        assert_eq!(
            resolved.engine.rule_policy("trunk-nonegotiate"),
            Some(&RulePolicy::with_level(Severity::Warning))
        );
        assert_eq!(resolved.limits.max_len, 200);
        assert_eq!(resolved.limits.step_budget, 500);
        assert_eq!(resolved.limits.timeout, Duration::from_millis(5));
        assert_eq!(resolved.limits.cache_capacity, 0);
        assert_eq!(
            resolved.schema_for(None).expect("schema").vendor,
            "juniper-junos"
        );
    }

    #[test]
    fn overrides_win_over_the_file() {
        let resolved = resolve(
            "profile = \"audit\"\nvendor = \"cisco-ios\"\nmax_results = 10\nfail_on = \"never\"",
            Overrides {
                profile: Some("strict".to_string()),
                vendor: Some("arista-eos".to_string()),
                max_results: Some(3),
                fail_on: Some("error".to_string()),
            },
        )
        .expect("resolve");
        assert_eq!(resolved.engine.profile, "strict");
        assert_eq!(resolved.engine.fail_on, FailOn::Error);
        assert_eq!(resolved.engine.max_results, Some(3));
        assert_eq!(resolved.vendor.as_deref(), Some("arista-eos"));
    }

    #[test]
    fn custom_schemas_resolve_and_shadow_presets() {
        let resolved = resolve(
            r#"
vendor = "my-dialect"

[schemas.my-dialect]
vendor = "my-dialect"
style = { kind = "indent" }
comment_prefixes = ["!"]

[schemas.cisco-ios]
vendor = "cisco-ios-custom"
style = { kind = "braces" }
"#,
            Overrides::default(),
        )
        .expect("resolve");

        let schema = resolved.schema_for(None).expect("custom");
        assert_eq!(schema.vendor, "my-dialect");
        assert_eq!(schema.style, BlockStyle::Indent);
        assert_eq!(schema.comment_prefixes, vec!["!".to_string()]);

        let shadowed = resolved.schema_for(Some("cisco-ios")).expect("shadowed");
        assert_eq!(shadowed.vendor, "cisco-ios-custom");
        assert_eq!(
            resolved.schema_for(Some("fortigate")).expect("preset").vendor,
            "fortios"
        );
    }

    #[test]
    fn invalid_values_are_errors() {
        for toml in [
            "profile = \"lenient\"",
            "fail_on = \"sometimes\"",
            "vendor = \"nosuchvendor\"",
            "schema = \"netguard.config.v9\"",
            "[rules.r]\nlevel = \"critical\"",
            "[evaluator]\nstep_budget = 0",
        ] {
            assert!(resolve(toml, Overrides::default()).is_err(), "{toml}");
        }
        assert!(parse_config_toml("max_results = \"many\"").is_err());
    }

    #[test]
    fn missing_vendor_is_reported() {
        let resolved = resolve("", Overrides::default()).expect("resolve");
        let err = resolved.schema_for(None).expect_err("no vendor");
        assert!(err.to_string().contains("no vendor given"));
    }
}
