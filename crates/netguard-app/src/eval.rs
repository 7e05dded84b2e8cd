//! The `eval` use case: try an expression against the nodes of a configuration.

use crate::check::{SourceInput, resolve, rule_context};
use anyhow::Context;
use netguard_domain::Selector;
use netguard_model::preorder;
use netguard_settings::Overrides;
use netguard_types::SourceLoc;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct EvalInput<'a> {
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub expr: &'a str,
    pub source: &'a SourceInput,
    /// Only nodes matching this selector are evaluated; all nodes when absent.
    pub selector: Option<&'a str>,
}

/// Outcome for one node. `result` is `None` when evaluation failed; `error` says why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EvalMatch {
    pub node_id: String,
    pub loc: SourceLoc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EvalOutput {
    pub matches: Vec<EvalMatch>,
}

impl EvalOutput {
    pub fn true_count(&self) -> usize {
        self.matches.iter().filter(|m| m.result == Some(true)).count()
    }
}

/// Evaluate `expr` against every selected node.
///
/// Static rejections and syntax errors fail the whole call; runtime errors are reported per
/// node.
pub fn run_eval(input: EvalInput<'_>) -> anyhow::Result<EvalOutput> {
    let resolved = resolve(input.config_text, input.overrides)?;
    let ctx = rule_context(&resolved.limits);
    let evaluator = ctx.evaluator();
    evaluator
        .compile(input.expr)
        .map_err(anyhow::Error::new)
        .context("expression rejected")?;

    let selector = match input.selector {
        Some(text) => Selector::parse(text).context("invalid selector")?,
        None => Selector::All,
    };
    let schema = resolved
        .schema_for(input.source.vendor.as_deref())
        .with_context(|| format!("select schema for {}", input.source.name))?;
    let forest = netguard_parser::parse(&input.source.text, &schema);

    let matches = preorder(&forest)
        .filter(|node| selector.matches(&node.id))
        .map(|node| {
            let (result, error) = match evaluator.try_evaluate(input.expr, node) {
                Ok(value) => (Some(value), None),
                Err(err) => (None, Some(err.to_string())),
            };
            EvalMatch {
                node_id: node.id.clone(),
                loc: node.loc,
                result,
                error,
            }
        })
        .collect();
    Ok(EvalOutput { matches })
}
