use crate::model::{HelperArgSpec, JsonCheck, NodeRef};
use netguard_expr::{ExprEvaluator, compile_regex};
use netguard_helpers::{HelperArg, HelperRegistry};
use netguard_model::{ConfigNode, text};
use regex::Regex;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Shared evaluation state for JSON checks: the expression evaluator and, through it, the
/// helper registry.
#[derive(Clone, Debug, Default)]
pub struct RuleContext {
    evaluator: Arc<ExprEvaluator>,
}

impl RuleContext {
    pub fn new(evaluator: Arc<ExprEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Default evaluator limits over a custom registry.
    pub fn with_helpers(helpers: Arc<HelperRegistry>) -> Self {
        Self::new(Arc::new(ExprEvaluator::new(helpers)))
    }

    pub fn evaluator(&self) -> &ExprEvaluator {
        &self.evaluator
    }

    pub fn helpers(&self) -> &HelperRegistry {
        self.evaluator.helpers()
    }
}

/// A regex from a rule, compiled once. A pattern that does not compile never matches.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    pub fn new(pattern: &str, flags: Option<&str>) -> Self {
        let regex = compile_regex(pattern, flags.unwrap_or_default())
            .inspect_err(|err| debug!(pattern, error = %err, "rule pattern does not compile"))
            .ok();
        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    fn is_match(&self, haystack: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(haystack))
    }
}

/// A [`JsonCheck`] with its patterns compiled and child selectors folded.
#[derive(Clone, Debug)]
pub enum CompiledCheck {
    Match(Pattern),
    NotMatch(Pattern),
    Contains(String),
    NotContains(String),
    ChildExists(String),
    ChildNotExists(String),
    ChildMatches {
        selector: Option<String>,
        pattern: Pattern,
    },
    ChildContains {
        selector: Option<String>,
        text: String,
    },
    Helper {
        name: String,
        args: Vec<HelperArgSpec>,
        negate: bool,
    },
    Expr(String),
    And(Vec<CompiledCheck>),
    Or(Vec<CompiledCheck>),
    Not(Box<CompiledCheck>),
}

impl CompiledCheck {
    pub fn compile(check: &JsonCheck) -> Self {
        match check {
            JsonCheck::Match { pattern, flags } => {
                CompiledCheck::Match(Pattern::new(pattern, flags.as_deref()))
            }
            JsonCheck::NotMatch { pattern, flags } => {
                CompiledCheck::NotMatch(Pattern::new(pattern, flags.as_deref()))
            }
            JsonCheck::Contains { text } => CompiledCheck::Contains(text.clone()),
            JsonCheck::NotContains { text } => CompiledCheck::NotContains(text.clone()),
            JsonCheck::ChildExists { selector } => {
                CompiledCheck::ChildExists(text::fold_key(selector))
            }
            JsonCheck::ChildNotExists { selector } => {
                CompiledCheck::ChildNotExists(text::fold_key(selector))
            }
            JsonCheck::ChildMatches {
                selector,
                pattern,
                flags,
            } => CompiledCheck::ChildMatches {
                selector: selector.as_deref().map(text::fold_key),
                pattern: Pattern::new(pattern, flags.as_deref()),
            },
            JsonCheck::ChildContains { selector, text } => CompiledCheck::ChildContains {
                selector: selector.as_deref().map(text::fold_key),
                text: text.clone(),
            },
            JsonCheck::Helper {
                helper,
                args,
                negate,
            } => CompiledCheck::Helper {
                name: helper.clone(),
                args: args.clone(),
                negate: *negate,
            },
            JsonCheck::Expr { expr } => CompiledCheck::Expr(expr.clone()),
            JsonCheck::And { conditions } => {
                CompiledCheck::And(conditions.iter().map(CompiledCheck::compile).collect())
            }
            JsonCheck::Or { conditions } => {
                CompiledCheck::Or(conditions.iter().map(CompiledCheck::compile).collect())
            }
            JsonCheck::Not { condition } => {
                CompiledCheck::Not(Box::new(CompiledCheck::compile(condition)))
            }
        }
    }

    /// Patterns in this tree that failed to compile.
    pub fn invalid_patterns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_invalid(&mut out);
        out
    }

    fn collect_invalid<'s>(&'s self, out: &mut Vec<&'s str>) {
        match self {
            CompiledCheck::Match(p)
            | CompiledCheck::NotMatch(p)
            | CompiledCheck::ChildMatches { pattern: p, .. } => {
                if !p.is_valid() {
                    out.push(p.source());
                }
            }
            CompiledCheck::And(checks) | CompiledCheck::Or(checks) => {
                for check in checks {
                    check.collect_invalid(out);
                }
            }
            CompiledCheck::Not(check) => check.collect_invalid(out),
            _ => {}
        }
    }

    pub fn evaluate(&self, node: &ConfigNode, ctx: &RuleContext) -> bool {
        match self {
            CompiledCheck::Match(pattern) => pattern.is_match(&node.id),
            CompiledCheck::NotMatch(pattern) => pattern.is_valid() && !pattern.is_match(&node.id),
            CompiledCheck::Contains(needle) => node.id.contains(needle.as_str()),
            CompiledCheck::NotContains(needle) => !node.id.contains(needle.as_str()),
            CompiledCheck::ChildExists(prefix) => child_with_prefix(node, prefix).next().is_some(),
            CompiledCheck::ChildNotExists(prefix) => {
                child_with_prefix(node, prefix).next().is_none()
            }
            CompiledCheck::ChildMatches { selector, pattern } => {
                candidates(node, selector.as_deref()).any(|c| pattern.is_match(&c.id))
            }
            CompiledCheck::ChildContains { selector, text } => {
                candidates(node, selector.as_deref()).any(|c| c.id.contains(text.as_str()))
            }
            CompiledCheck::Helper { name, args, negate } => {
                call_helper(name, args, node, ctx).is_some_and(|result| result != *negate)
            }
            CompiledCheck::Expr(src) => ctx.evaluator().evaluate(src, node),
            CompiledCheck::And(checks) => checks.iter().all(|c| c.evaluate(node, ctx)),
            CompiledCheck::Or(checks) => checks.iter().any(|c| c.evaluate(node, ctx)),
            CompiledCheck::Not(check) => !check.evaluate(node, ctx),
        }
    }
}

/// Evaluate a check directly, compiling its patterns on the way.
///
/// Never fails: invalid patterns, unknown helpers and rejected expressions evaluate to `false`.
pub fn evaluate(check: &JsonCheck, node: &ConfigNode, ctx: &RuleContext) -> bool {
    CompiledCheck::compile(check).evaluate(node, ctx)
}

fn child_with_prefix<'n>(
    node: &'n ConfigNode,
    folded: &'n str,
) -> impl Iterator<Item = &'n ConfigNode> {
    node.children
        .iter()
        .filter(move |c| text::starts_with_folded(&c.id, folded))
}

fn candidates<'n>(
    node: &'n ConfigNode,
    selector: Option<&'n str>,
) -> impl Iterator<Item = &'n ConfigNode> {
    node.children
        .iter()
        .filter(move |c| selector.is_none_or(|s| text::starts_with_folded(&c.id, s)))
}

/// `None` when the helper is unknown or errors; `negate` never turns that into a pass.
fn call_helper(
    name: &str,
    specs: &[HelperArgSpec],
    node: &ConfigNode,
    ctx: &RuleContext,
) -> Option<bool> {
    let Some(helper) = ctx.helpers().resolve(name) else {
        debug!(helper = name, node = %node.id, "unknown helper; check fails");
        return None;
    };
    let args: Vec<HelperArg<'_>> = specs.iter().map(|spec| resolve_arg(spec, node)).collect();
    match helper(&args) {
        Ok(value) => Some(value.truthy()),
        Err(err) => {
            debug!(helper = name, node = %node.id, error = %err, "helper failed; check fails");
            None
        }
    }
}

fn resolve_arg<'a>(spec: &'a HelperArgSpec, node: &'a ConfigNode) -> HelperArg<'a> {
    match spec {
        HelperArgSpec::Ref(r) => match r.target {
            NodeRef::Node => HelperArg::Node(node),
            NodeRef::Id => HelperArg::str(node.id.as_str()),
            NodeRef::Type => HelperArg::str(node.kind.as_str()),
            NodeRef::RawText => HelperArg::str(node.raw_text.as_str()),
            NodeRef::Children => HelperArg::Nodes(node.children.iter().collect()),
            NodeRef::Params => HelperArg::List(
                node.params
                    .iter()
                    .map(|p| HelperArg::Str(Cow::Borrowed(p.as_str())))
                    .collect(),
            ),
        },
        HelperArgSpec::Str(s) => HelperArg::str(s.as_str()),
        HelperArgSpec::Num(n) => HelperArg::Num(*n),
        HelperArgSpec::Bool(b) => HelperArg::Bool(*b),
        HelperArgSpec::List(items) => {
            HelperArg::List(items.iter().map(|i| resolve_arg(i, node)).collect())
        }
        HelperArgSpec::Null => HelperArg::Null,
    }
}
