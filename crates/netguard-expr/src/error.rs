use netguard_helpers::HelperError;
use thiserror::Error;

/// Why an expression was rejected or failed. [`crate::ExprEvaluator::evaluate`] maps every
/// variant to `false`.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExprError {
    #[error("expression is {len} characters long (limit {max})")]
    TooLong { len: usize, max: usize },

    #[error("expression mentions denied identifier `{0}`")]
    Denied(String),

    #[error("string interpolation is not allowed")]
    Interpolation,

    #[error("assignment operator `{0}` is not allowed")]
    Assignment(String),

    #[error("syntax error at {pos}: {message}")]
    Syntax { pos: usize, message: String },

    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("invalid regex `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("unknown identifier `{0}` (only `node` is defined)")]
    UnknownIdentifier(String),

    #[error("node has no property `{0}`")]
    UnknownProperty(String),

    #[error("no method `{method}` on {receiver}")]
    UnknownMethod {
        method: String,
        receiver: &'static str,
    },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("string result exceeds {0} characters")]
    StringTooLong(usize),

    #[error("step budget of {0} exhausted")]
    BudgetExhausted(u64),

    #[error("evaluation exceeded {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Helper(#[from] HelperError),
}
