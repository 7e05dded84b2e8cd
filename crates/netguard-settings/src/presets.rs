use netguard_domain::{EngineConfig, FailOn};
use std::collections::BTreeMap;

pub const PROFILES: &[&str] = &["strict", "default", "audit"];

/// Preset profiles are opinionated defaults; `None` for an unknown name.
pub fn preset(profile: &str) -> Option<EngineConfig> {
    match profile {
        "strict" => Some(profile_config("strict", FailOn::Warning)),
        "default" => Some(profile_config("default", FailOn::Error)),
        "audit" => Some(profile_config("audit", FailOn::Never)),
        _ => None,
    }
}

fn profile_config(name: &str, fail_on: FailOn) -> EngineConfig {
    EngineConfig {
        profile: name.to_string(),
        fail_on,
        max_results: Some(5000),
        rules: BTreeMap::new(),
    }
}
