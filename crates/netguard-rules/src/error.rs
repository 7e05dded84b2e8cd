use thiserror::Error;

/// Why a rule file was rejected. One bad rule rejects the whole file.
#[derive(Debug, Error)]
pub enum RuleFileError {
    #[error("rule file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule file: {0}")]
    Structure(String),

    #[error("unsupported rule file version `{0}` (expected \"1.0\")")]
    Version(String),

    /// The rule does not deserialize (unknown field, wrong type, unknown check type, bad `$ref`).
    #[error("rule {rule}: {message}")]
    Malformed { rule: String, message: String },

    #[error("rule {rule}: `{field}` {message}")]
    InvalidField {
        rule: String,
        field: String,
        message: String,
    },

    #[error("duplicate rule id `{0}`")]
    DuplicateId(String),
}

impl RuleFileError {
    pub(crate) fn field(rule: &str, field: &str, message: impl Into<String>) -> Self {
        RuleFileError::InvalidField {
            rule: rule.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}
