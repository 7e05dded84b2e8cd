use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HelperError {
    #[error("unknown helper `{0}`")]
    Unknown(String),

    #[error("helper `{helper}` expects {expected} argument(s), got {got}")]
    Arity {
        helper: String,
        expected: String,
        got: usize,
    },

    #[error("helper `{helper}` argument {index}: expected {expected}")]
    ArgType {
        helper: String,
        index: usize,
        expected: &'static str,
    },

    #[error("helper `{helper}` failed: {message}")]
    Failed { helper: String, message: String },
}
