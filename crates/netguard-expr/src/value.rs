use netguard_helpers::{HelperArg, HelperValue};
use netguard_model::ConfigNode;
use regex::Regex;
use std::borrow::Cow;
use std::sync::Arc;

/// Runtime value. Nodes are borrowed from the evaluated tree and only readable through
/// [`Value::node_property`].
#[derive(Clone, Debug)]
pub(crate) enum Value<'a> {
    Null,
    Bool(bool),
    Num(f64),
    Str(Cow<'a, str>),
    List(Vec<Value<'a>>),
    Node(&'a ConfigNode),
    Regex(Arc<Regex>),
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Node(_) => "node",
            Value::Regex(_) => "regex",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Node(_) | Value::Regex(_) => true,
        }
    }

    /// Strict equality: values of different kinds are never equal.
    pub fn strict_eq(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Node(a), Value::Node(b)) => std::ptr::eq(*a, *b),
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }

    /// The read-only node view: `id`, `type`, `rawText`, `params`, `children`.
    pub fn node_property(node: &'a ConfigNode, name: &str) -> Option<Value<'a>> {
        let value = match name {
            "id" => Value::Str(Cow::Borrowed(node.id.as_str())),
            "type" => Value::Str(Cow::Borrowed(node.kind.as_str())),
            "rawText" => Value::Str(Cow::Borrowed(node.raw_text.as_str())),
            "params" => Value::List(
                node.params
                    .iter()
                    .map(|p| Value::Str(Cow::Borrowed(p.as_str())))
                    .collect(),
            ),
            "children" => Value::List(node.children.iter().map(Value::Node).collect()),
            _ => return None,
        };
        Some(value)
    }

    /// String form used by `+` concatenation and `join`; `None` for lists and regexes.
    pub fn display(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => Some(Cow::Borrowed("null")),
            Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Value::Num(n) => Some(Cow::Owned(format_num(*n))),
            Value::Str(s) => Some(Cow::Borrowed(s.as_ref())),
            Value::Node(node) => Some(Cow::Borrowed(node.id.as_str())),
            Value::List(_) | Value::Regex(_) => None,
        }
    }

    pub fn to_arg(&self) -> HelperArg<'a> {
        match self {
            Value::Null => HelperArg::Null,
            Value::Bool(b) => HelperArg::Bool(*b),
            Value::Num(n) => HelperArg::Num(*n),
            Value::Str(s) => HelperArg::Str(s.clone()),
            Value::Node(node) => HelperArg::Node(node),
            Value::Regex(re) => HelperArg::Str(Cow::Owned(re.as_str().to_string())),
            Value::List(items) => {
                let nodes: Option<Vec<&'a ConfigNode>> = items
                    .iter()
                    .map(|item| match item {
                        Value::Node(node) => Some(*node),
                        _ => None,
                    })
                    .collect();
                match nodes {
                    Some(nodes) if !nodes.is_empty() => HelperArg::Nodes(nodes),
                    _ => HelperArg::List(items.iter().map(Value::to_arg).collect()),
                }
            }
        }
    }
}

impl<'a> From<HelperValue<'a>> for Value<'a> {
    fn from(value: HelperValue<'a>) -> Self {
        match value {
            HelperValue::Null => Value::Null,
            HelperValue::Bool(b) => Value::Bool(b),
            HelperValue::Num(n) => Value::Num(n),
            HelperValue::Str(s) => Value::Str(Cow::Owned(s)),
            HelperValue::Node(node) => Value::Node(node),
            HelperValue::Nodes(nodes) => Value::List(nodes.into_iter().map(Value::Node).collect()),
            HelperValue::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
        }
    }
}

/// Integral values print without a fractional part (`3`, not `3.0`).
pub(crate) fn format_num(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
