//! Schema-aware configuration parser.
//!
//! One implementation, parameterized by a [`SchemaDescriptor`], turns vendor configuration
//! text into a forest of [`ConfigNode`]s. Parsing is best-effort and never fails: blank,
//! comment and terminator lines are dropped, and structural anomalies (unexpected dedent,
//! stray closers, unterminated quotes) are recovered locally.

#![forbid(unsafe_code)]

mod lines;
pub mod presets;
mod schema;
mod tree;

#[cfg(test)]
mod proptest;

use netguard_model::{ConfigNode, count_nodes};
use tracing::debug;

pub use schema::{BlockComment, BlockStyle, KeywordBlock, SchemaDescriptor};

/// Parse `text` into a top-level forest using `schema`.
///
/// Deterministic: the same input and schema always produce an identical tree, locations
/// included.
pub fn parse(text: &str, schema: &SchemaDescriptor) -> Vec<ConfigNode> {
    let lines = lines::split(text, schema);
    let mut builder = tree::TreeBuilder::new(schema);
    for line in &lines {
        builder.push(line);
    }
    let forest = builder.finish();
    debug!(
        vendor = %schema.vendor,
        logical_lines = lines.len(),
        nodes = count_nodes(&forest),
        "parsed configuration"
    );
    forest
}

/// Parse with a shipped preset; `None` when the preset name is unknown.
pub fn parse_with_preset(text: &str, preset: &str) -> Option<Vec<ConfigNode>> {
    presets::lookup(preset).map(|schema| parse(text, &schema))
}

/// Fuzz-friendly API for testing parsing robustness.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text with every shipped preset and return the total node count.
    /// **Never panics** on any input.
    pub fn parse_all_presets(text: &str) -> usize {
        presets::available()
            .iter()
            .filter_map(|name| presets::lookup(name))
            .map(|schema| count_nodes(&parse(text, &schema)))
            .sum()
    }

    /// Parse arbitrary JSON as a [`SchemaDescriptor`] and, when valid, parse `text` with it.
    ///
    /// Returns `Err` for invalid descriptors. **Never panics** on any input.
    pub fn parse_with_descriptor(descriptor_json: &str, text: &str) -> serde_json::Result<usize> {
        let schema: SchemaDescriptor = serde_json::from_str(descriptor_json)?;
        Ok(count_nodes(&parse(text, &schema)))
    }
}
