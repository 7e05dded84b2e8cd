//! Sandboxed expression evaluator for declarative rules.
//!
//! Expressions are a small purpose-built language evaluated against one read-only config node:
//!
//! ```text
//! node.id =~ /^interface (Gig|Ten)/i && !hasChildCommand(node, "shutdown")
//! ```
//!
//! Before parsing, the raw text is checked for length, denied names and interpolation, and
//! its identifier tokens against [`DENIED_IDENTIFIERS`]; the lexer rejects assignment
//! operators. Evaluation runs under a step budget and a
//! wall-clock deadline. [`ExprEvaluator::evaluate`] fails closed: every error is `false`.

#![forbid(unsafe_code)]

mod ast;
mod cache;
mod error;
mod eval;
mod guard;
mod lexer;
mod parser;
mod pattern;
mod value;

#[cfg(test)]
mod proptest;

pub use ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
pub use error::ExprError;
pub use guard::{DENIED_IDENTIFIERS, DENYLIST};
pub use pattern::compile_regex;

use cache::ExprCache;
use netguard_helpers::HelperRegistry;
use netguard_model::ConfigNode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Resource bounds applied to every expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum source length in characters.
    pub max_len: usize,
    pub step_budget: u64,
    pub timeout: Duration,
    pub max_depth: usize,
    /// Maximum length of any string produced during evaluation.
    pub max_string_len: usize,
    pub cache_capacity: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_len: 1000,
            step_budget: 10_000,
            timeout: Duration::from_millis(50),
            max_depth: 64,
            max_string_len: 10_000,
            cache_capacity: 1024,
        }
    }
}

/// Evaluates expressions against config nodes, caching parsed ASTs by source text.
///
/// Each evaluation gets a fresh scope in which `node` is the only free identifier; calls resolve
/// to built-in methods or to functions in the helper registry.
#[derive(Debug)]
pub struct ExprEvaluator {
    limits: EvalLimits,
    cache: ExprCache,
    helpers: Arc<HelperRegistry>,
}

impl Default for ExprEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(netguard_helpers::builtin()))
    }
}

impl ExprEvaluator {
    pub fn new(helpers: Arc<HelperRegistry>) -> Self {
        Self::with_limits(helpers, EvalLimits::default())
    }

    pub fn with_limits(helpers: Arc<HelperRegistry>, limits: EvalLimits) -> Self {
        Self {
            cache: ExprCache::new(limits.cache_capacity),
            limits,
            helpers,
        }
    }

    pub fn limits(&self) -> &EvalLimits {
        &self.limits
    }

    pub fn helpers(&self) -> &Arc<HelperRegistry> {
        &self.helpers
    }

    /// Run the static checks and parse, reusing a cached AST when one exists.
    pub fn compile(&self, src: &str) -> Result<Arc<Expr>, ExprError> {
        guard::check(src, self.limits.max_len)?;
        if let Some(expr) = self.cache.get(src) {
            return Ok(expr);
        }
        let expr = Arc::new(parser::parse(src, self.limits.max_depth)?);
        self.cache.insert(src, expr.clone());
        Ok(expr)
    }

    /// Evaluate to a boolean, reporting why an expression was rejected or failed.
    pub fn try_evaluate(&self, src: &str, node: &ConfigNode) -> Result<bool, ExprError> {
        let expr = self.compile(src)?;
        eval::Interpreter::new(node, &self.helpers, &self.limits).run(&expr)
    }

    /// Evaluate to a boolean. Any error yields `false`.
    pub fn evaluate(&self, src: &str, node: &ConfigNode) -> bool {
        match self.try_evaluate(src, node) {
            Ok(result) => result,
            Err(err) => {
                debug!(expr = src, node = %node.id, error = %err, "expression evaluated to false");
                false
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_helpers::{ArgReader, HelperArg, HelperError, HelperRegistryBuilder, HelperValue};

    fn trunk() -> ConfigNode {
        ConfigNode::section(
            "interface GigabitEthernet0/1",
            vec![
                ConfigNode::command("switchport mode trunk"),
                ConfigNode::command("switchport trunk allowed vlan 10,20"),
            ],
        )
    }

    #[test]
    fn evaluates_against_the_node() {
        let evaluator = ExprEvaluator::default();
        let node = trunk();
        assert!(evaluator.evaluate("node.id.startsWith('interface')", &node));
        assert!(evaluator.evaluate(
            "hasChildCommand(node, 'switchport mode trunk') && !isShutdown(node)",
            &node
        ));
        assert!(!evaluator.evaluate("node.type == 'command'", &node));
    }

    #[test]
    fn rejections_are_false() {
        let evaluator = ExprEvaluator::default();
        let node = trunk();
        for src in [
            "node.constructor",
            "process.exit()",
            "require('fs')",
            "`${node.id}`",
            "node.id = 'x'",
            "node.id += 'x'",
            "node.id ==",
            "node.nope",
            "frobnicate(node)",
        ] {
            assert!(!evaluator.evaluate(src, &node), "{src}");
            assert!(evaluator.try_evaluate(src, &node).is_err(), "{src}");
        }
        let long = format!("'{}' == ''", "a".repeat(1000));
        assert!(matches!(
            evaluator.try_evaluate(&long, &node),
            Err(ExprError::TooLong { max: 1000, .. })
        ));
    }

    #[test]
    fn vendor_helpers_resolve_through_namespaces() {
        fn is_trunk_port<'a>(args: &[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> {
            let node = ArgReader::new("cisco.isTrunkPort", args).node(0)?;
            Ok(node.child_with_prefix("switchport mode trunk").is_some().into())
        }

        let registry = HelperRegistryBuilder::new()
            .with_builtins()
            .vendor("cisco", "isTrunkPort", is_trunk_port)
            .build();
        let evaluator = ExprEvaluator::new(Arc::new(registry));
        assert!(evaluator.evaluate("cisco.isTrunkPort(node)", &trunk()));
        assert!(!evaluator.evaluate("juniper.isTrunkPort(node)", &trunk()));
    }

    #[test]
    fn compiled_expressions_are_cached_by_text() {
        let evaluator = ExprEvaluator::default();
        let node = trunk();
        assert!(evaluator.evaluate("node.children.length == 2", &node));
        assert!(evaluator.evaluate("node.children.length == 2", &node));
        assert_eq!(evaluator.cache_len(), 1);
        assert!(!evaluator.evaluate("node.constructor", &node));
        assert_eq!(evaluator.cache_len(), 1);
        evaluator.clear_cache();
        assert_eq!(evaluator.cache_len(), 0);
    }

    #[test]
    fn limits_are_configurable() {
        let limits = EvalLimits {
            max_len: 10,
            ..EvalLimits::default()
        };
        let evaluator = ExprEvaluator::with_limits(Arc::new(netguard_helpers::builtin()), limits);
        assert!(!evaluator.evaluate("node.id.length > 0", &trunk()));
        assert!(evaluator.evaluate("true", &trunk()));
    }
}
