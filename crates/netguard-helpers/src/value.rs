use crate::HelperError;
use netguard_model::ConfigNode;
use std::borrow::Cow;

/// Argument passed to a helper. Nodes are borrowed read-only from the parsed tree.
#[derive(Clone, Debug, PartialEq)]
pub enum HelperArg<'a> {
    Node(&'a ConfigNode),
    Nodes(Vec<&'a ConfigNode>),
    Str(Cow<'a, str>),
    Num(f64),
    Bool(bool),
    List(Vec<HelperArg<'a>>),
    Null,
}

impl<'a> HelperArg<'a> {
    pub fn str(s: impl Into<Cow<'a, str>>) -> Self {
        HelperArg::Str(s.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HelperArg::Node(_) => "node",
            HelperArg::Nodes(_) => "node list",
            HelperArg::Str(_) => "string",
            HelperArg::Num(_) => "number",
            HelperArg::Bool(_) => "bool",
            HelperArg::List(_) => "list",
            HelperArg::Null => "null",
        }
    }
}

/// Result of a helper call.
#[derive(Clone, Debug, PartialEq)]
pub enum HelperValue<'a> {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Node(&'a ConfigNode),
    Nodes(Vec<&'a ConfigNode>),
    List(Vec<HelperValue<'a>>),
}

impl HelperValue<'_> {
    /// Boolean coercion used by rules: `null`, `false`, `0`, `NaN`, `""` and empty lists are
    /// false; everything else, nodes included, is true.
    pub fn truthy(&self) -> bool {
        match self {
            HelperValue::Null => false,
            HelperValue::Bool(b) => *b,
            HelperValue::Num(n) => *n != 0.0 && !n.is_nan(),
            HelperValue::Str(s) => !s.is_empty(),
            HelperValue::Node(_) => true,
            HelperValue::Nodes(nodes) => !nodes.is_empty(),
            HelperValue::List(items) => !items.is_empty(),
        }
    }
}

impl From<bool> for HelperValue<'_> {
    fn from(value: bool) -> Self {
        HelperValue::Bool(value)
    }
}

impl From<f64> for HelperValue<'_> {
    fn from(value: f64) -> Self {
        HelperValue::Num(value)
    }
}

impl From<String> for HelperValue<'_> {
    fn from(value: String) -> Self {
        HelperValue::Str(value)
    }
}

impl From<&str> for HelperValue<'_> {
    fn from(value: &str) -> Self {
        HelperValue::Str(value.to_string())
    }
}

impl<'a> From<Option<&'a ConfigNode>> for HelperValue<'a> {
    fn from(value: Option<&'a ConfigNode>) -> Self {
        value.map_or(HelperValue::Null, HelperValue::Node)
    }
}

/// Typed access to a helper's arguments with uniform error reporting.
pub struct ArgReader<'h, 'a> {
    helper: &'h str,
    args: &'h [HelperArg<'a>],
}

impl<'h, 'a> ArgReader<'h, 'a> {
    pub fn new(helper: &'h str, args: &'h [HelperArg<'a>]) -> Self {
        Self { helper, args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Require between `min` and `max` arguments (inclusive).
    pub fn arity(&self, min: usize, max: usize) -> Result<(), HelperError> {
        let got = self.args.len();
        if got < min || got > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min}..={max}")
            };
            return Err(HelperError::Arity {
                helper: self.helper.to_string(),
                expected,
                got,
            });
        }
        Ok(())
    }

    pub fn node(&self, index: usize) -> Result<&'a ConfigNode, HelperError> {
        match self.args.get(index) {
            Some(HelperArg::Node(node)) => Ok(*node),
            _ => Err(self.type_error(index, "node")),
        }
    }

    pub fn str(&self, index: usize) -> Result<&'h str, HelperError> {
        match self.args.get(index) {
            Some(HelperArg::Str(s)) => Ok(s.as_ref()),
            _ => Err(self.type_error(index, "string")),
        }
    }

    /// The `id` of a node argument, or a string argument as is.
    pub fn text(&self, index: usize) -> Result<&'h str, HelperError> {
        match self.args.get(index) {
            Some(HelperArg::Node(node)) => Ok(node.id.as_str()),
            Some(HelperArg::Str(s)) => Ok(s.as_ref()),
            _ => Err(self.type_error(index, "node or string")),
        }
    }

    pub fn num(&self, index: usize) -> Result<f64, HelperError> {
        match self.args.get(index) {
            Some(HelperArg::Num(n)) => Ok(*n),
            _ => Err(self.type_error(index, "number")),
        }
    }

    /// Optional string argument; absent or `null` yields `None`.
    pub fn opt_str(&self, index: usize) -> Result<Option<&'h str>, HelperError> {
        match self.args.get(index) {
            None | Some(HelperArg::Null) => Ok(None),
            Some(HelperArg::Str(s)) => Ok(Some(s.as_ref())),
            Some(_) => Err(self.type_error(index, "string")),
        }
    }

    fn type_error(&self, index: usize, expected: &'static str) -> HelperError {
        HelperError::ArgType {
            helper: self.helper.to_string(),
            index,
            expected,
        }
    }
}
