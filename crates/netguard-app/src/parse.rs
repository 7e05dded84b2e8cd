//! The `parse` use case: show the tree a configuration parses into.

use crate::check::{SourceInput, resolve};
use anyhow::Context;
use netguard_model::{ConfigNode, count_nodes};
use netguard_settings::Overrides;
use tracing::info;

#[derive(Clone, Debug)]
pub struct ParseInput<'a> {
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub source: &'a SourceInput,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutput {
    /// Vendor of the schema used.
    pub vendor: String,
    pub forest: Vec<ConfigNode>,
}

impl ParseOutput {
    pub fn node_count(&self) -> usize {
        count_nodes(&self.forest)
    }
}

pub fn run_parse(input: ParseInput<'_>) -> anyhow::Result<ParseOutput> {
    let resolved = resolve(input.config_text, input.overrides)?;
    let schema = resolved
        .schema_for(input.source.vendor.as_deref())
        .with_context(|| format!("select schema for {}", input.source.name))?;
    let forest = netguard_parser::parse(&input.source.text, &schema);
    info!(source = %input.source.name, vendor = %schema.vendor, "parsed configuration");
    Ok(ParseOutput {
        vendor: schema.vendor,
        forest,
    })
}
