//! The `vendors` use case: list the dialects an input can be parsed with.

use crate::check::resolve;
use netguard_parser::presets;
use netguard_settings::Overrides;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorOrigin {
    Preset,
    /// A `[schemas]` entry in `netguard.toml`.
    Config,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VendorEntry {
    pub name: String,
    pub style: &'static str,
    pub origin: VendorOrigin,
}

/// Shipped presets followed by configured schemas. A configured schema that shadows a preset
/// replaces it in place.
pub fn run_vendors(config_text: &str) -> anyhow::Result<Vec<VendorEntry>> {
    let resolved = resolve(config_text, Overrides::default())?;
    let mut entries = Vec::new();
    for name in presets::available() {
        let entry = match resolved.schemas.get(*name) {
            Some(custom) => VendorEntry {
                name: name.to_string(),
                style: custom.style.kind(),
                origin: VendorOrigin::Config,
            },
            None => {
                let Some(schema) = presets::lookup(name) else {
                    continue;
                };
                VendorEntry {
                    name: name.to_string(),
                    style: schema.style.kind(),
                    origin: VendorOrigin::Preset,
                }
            }
        };
        entries.push(entry);
    }
    for (name, schema) in &resolved.schemas {
        if presets::available().contains(&name.as_str()) {
            continue;
        }
        entries.push(VendorEntry {
            name: name.clone(),
            style: schema.style.kind(),
            origin: VendorOrigin::Config,
        });
    }
    Ok(entries)
}
