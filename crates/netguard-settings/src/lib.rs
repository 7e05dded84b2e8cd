//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{EvaluatorConfig, NetguardConfigV1, RuleConfig, SCHEMA_CONFIG_V1};
pub use presets::PROFILES;
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `netguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<NetguardConfigV1> {
    let cfg: NetguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config (profile + file + overrides).
pub fn resolve_config(
    cfg: NetguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
