//! Fuzz target for the sandboxed expression evaluator.
//!
//! Goal: compiling and evaluating arbitrary expressions against arbitrary nodes **never
//! panics** and always terminates within the evaluator's limits.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_expr_evaluator
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use netguard_expr::ExprEvaluator;
use netguard_model::ConfigNode;
use std::sync::{Arc, LazyLock};

static EVALUATOR: LazyLock<ExprEvaluator> =
    LazyLock::new(|| ExprEvaluator::new(Arc::new(netguard_helpers::builtin())));

#[derive(Arbitrary, Debug)]
struct ExprInput {
    expr: String,
    /// Node id of the evaluated command.
    id: String,
    children: Vec<String>,
}

fuzz_target!(|input: ExprInput| {
    if input.expr.len() > 2048 || input.id.len() > 512 || input.children.len() > 16 {
        return;
    }
    let children = input
        .children
        .iter()
        .filter(|c| c.len() <= 512)
        .map(|c| ConfigNode::command(c))
        .collect();
    let node = ConfigNode::section(&input.id, children);

    // Errors are fine; panics are not.
    let _ = EVALUATOR.try_evaluate(&input.expr, &node);
    let _ = EVALUATOR.evaluate(&input.expr, &node);
});
