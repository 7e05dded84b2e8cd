//! Generic structural helpers registered in the common namespace.

use crate::{ArgReader, HelperArg, HelperError, HelperRegistry, HelperRegistryBuilder, HelperValue};
use netguard_model::text;

/// Names registered by [`HelperRegistryBuilder::with_builtins`].
pub const BUILTIN_HELPERS: &[&str] = &[
    "hasChildCommand",
    "getChildCommand",
    "getChildCommands",
    "getParam",
    "paramCount",
    "startsWith",
    "includesText",
    "isShutdown",
];

/// Child ids that mark an administratively disabled block.
const SHUTDOWN_MARKERS: &[&str] = &["shutdown", "disable", "set status down"];

/// A registry holding only the common built-ins.
pub fn builtin() -> HelperRegistry {
    HelperRegistryBuilder::new().with_builtins().build()
}

pub(crate) fn register(builder: HelperRegistryBuilder) -> HelperRegistryBuilder {
    builder
        .common("hasChildCommand", has_child_command)
        .common("getChildCommand", get_child_command)
        .common("getChildCommands", get_child_commands)
        .common("getParam", get_param)
        .common("paramCount", param_count)
        .common("startsWith", starts_with)
        .common("includesText", includes_text)
        .common("isShutdown", is_shutdown)
}

/// `hasChildCommand(node, prefix)`: some direct child starts with `prefix`.
fn has_child_command<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("hasChildCommand", args);
    reader.arity(2, 2)?;
    let node = reader.node(0)?;
    Ok(node.child_with_prefix(reader.str(1)?).is_some().into())
}

/// `getChildCommand(node, prefix)`: first matching direct child, or `null`.
fn get_child_command<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("getChildCommand", args);
    reader.arity(2, 2)?;
    let node = reader.node(0)?;
    Ok(node.child_with_prefix(reader.str(1)?).into())
}

/// `getChildCommands(node, prefix?)`: every matching direct child.
fn get_child_commands<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("getChildCommands", args);
    reader.arity(1, 2)?;
    let node = reader.node(0)?;
    let prefix = reader.opt_str(1)?.unwrap_or_default();
    Ok(HelperValue::Nodes(node.children_with_prefix(prefix).collect()))
}

/// `getParam(node, index)`: the token at `index` (negative counts from the end), or `null`.
fn get_param<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("getParam", args);
    reader.arity(2, 2)?;
    let node = reader.node(0)?;
    let index = reader.num(1)?;
    if index.fract() != 0.0 || !index.is_finite() {
        return Ok(HelperValue::Null);
    }
    let len = node.params.len() as f64;
    let resolved = if index < 0.0 { len + index } else { index };
    if resolved < 0.0 || resolved >= len {
        return Ok(HelperValue::Null);
    }
    Ok(node
        .param(resolved as usize)
        .map_or(HelperValue::Null, HelperValue::from))
}

fn param_count<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("paramCount", args);
    reader.arity(1, 1)?;
    Ok(HelperValue::Num(reader.node(0)?.params.len() as f64))
}

/// `startsWith(nodeOrText, prefix)`: case-insensitive, whitespace-normalized prefix test.
fn starts_with<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("startsWith", args);
    reader.arity(2, 2)?;
    Ok(text::starts_with_ignore_case(reader.text(0)?, reader.str(1)?).into())
}

/// `includesText(nodeOrText, needle)`: case-insensitive substring test.
fn includes_text<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("includesText", args);
    reader.arity(2, 2)?;
    let haystack = reader.text(0)?.to_lowercase();
    let needle = reader.str(1)?.to_lowercase();
    Ok(haystack.contains(&needle).into())
}

/// `isShutdown(node)`: the node has a direct child that disables it.
fn is_shutdown<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
    let reader = ArgReader::new("isShutdown", args);
    reader.arity(1, 1)?;
    let node = reader.node(0)?;
    let disabled = node.children.iter().any(|child| {
        SHUTDOWN_MARKERS
            .iter()
            .any(|marker| text::fold_key(&child.id) == *marker)
    });
    Ok(disabled.into())
}
