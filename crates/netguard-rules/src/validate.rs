use crate::RuleFileError;
use crate::model::{JsonCheck, JsonRule, JsonRuleFile, RULE_FILE_VERSION, RuleFileMeta};
use netguard_domain::{Selector, VendorFilter};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const MAX_RULE_ID_LEN: usize = 128;
pub const MAX_OWNER_LEN: usize = 100;
pub const MAX_CHECK_DEPTH: usize = 32;

const FILE_KEYS: &[&str] = &["$schema", "version", "meta", "rules"];

/// Full structural validation of a single rule value.
pub fn is_json_rule(value: &Value) -> bool {
    rule_from_value(value.clone(), 0).is_ok()
}

/// Parse and validate a whole rule file. Any invalid rule rejects the file.
pub fn parse_rule_file(text: &str) -> Result<JsonRuleFile, RuleFileError> {
    let value: Value = serde_json::from_str(text)?;
    parse_rule_file_value(value)
}

pub fn parse_rule_file_value(value: Value) -> Result<JsonRuleFile, RuleFileError> {
    let Value::Object(mut obj) = value else {
        return Err(RuleFileError::Structure("expected a JSON object".to_string()));
    };
    if let Some(key) = obj.keys().find(|k| !FILE_KEYS.contains(&k.as_str())) {
        return Err(RuleFileError::Structure(format!("unknown field `{key}`")));
    }

    let version = match obj.remove("version") {
        Some(Value::String(v)) if v == RULE_FILE_VERSION => v,
        Some(Value::String(v)) => return Err(RuleFileError::Version(v)),
        Some(other) => return Err(RuleFileError::Version(other.to_string())),
        None => return Err(RuleFileError::Structure("missing `version`".to_string())),
    };
    let schema = take_string(&mut obj, "$schema")?;
    let meta = match obj.remove("meta") {
        None | Some(Value::Null) => None,
        Some(meta) => Some(
            serde_json::from_value::<RuleFileMeta>(meta)
                .map_err(|e| RuleFileError::Structure(format!("`meta`: {e}")))?,
        ),
    };
    let Some(Value::Array(values)) = obj.remove("rules") else {
        return Err(RuleFileError::Structure("`rules` must be an array".to_string()));
    };

    let mut seen = BTreeSet::new();
    let mut rules = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let rule = rule_from_value(value, index)?;
        if !seen.insert(rule.id.clone()) {
            return Err(RuleFileError::DuplicateId(rule.id));
        }
        rules.push(rule);
    }

    Ok(JsonRuleFile {
        schema,
        version,
        meta,
        rules,
    })
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> Result<Option<String>, RuleFileError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(RuleFileError::Structure(format!("`{key}` must be a string"))),
    }
}

fn rule_from_value(value: Value, index: usize) -> Result<JsonRule, RuleFileError> {
    let label = rule_label(&value, index);
    let rule: JsonRule = serde_json::from_value(value).map_err(|e| RuleFileError::Malformed {
        rule: label,
        message: e.to_string(),
    })?;
    validate_rule(&rule)?;
    Ok(rule)
}

/// `` `id` `` when the value carries a usable id, otherwise its position.
fn rule_label(value: &Value, index: usize) -> String {
    value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map_or_else(|| format!("#{index}"), |id| format!("`{id}`"))
}

/// Semantic checks beyond the serde shape: bounds, selector and vendor syntax, check nesting.
pub fn validate_rule(rule: &JsonRule) -> Result<(), RuleFileError> {
    let label = if rule.id.trim().is_empty() {
        "<empty id>".to_string()
    } else {
        format!("`{}`", rule.id)
    };

    if rule.id.trim().is_empty() {
        return Err(RuleFileError::field(&label, "id", "must not be empty"));
    }
    if rule.id.chars().count() > MAX_RULE_ID_LEN {
        return Err(RuleFileError::field(
            &label,
            "id",
            format!("exceeds {MAX_RULE_ID_LEN} characters"),
        ));
    }
    for (field, value) in [
        ("metadata.obu", &rule.metadata.obu),
        ("metadata.owner", &rule.metadata.owner),
    ] {
        if value.trim().is_empty() {
            return Err(RuleFileError::field(&label, field, "must not be empty"));
        }
        if value.chars().count() > MAX_OWNER_LEN {
            return Err(RuleFileError::field(
                &label,
                field,
                format!("exceeds {MAX_OWNER_LEN} characters"),
            ));
        }
    }

    if let Some(selector) = &rule.selector {
        Selector::parse(selector)
            .map_err(|e| RuleFileError::field(&label, "selector", e.to_string()))?;
    }
    if let Some(vendor) = &rule.vendor {
        let patterns = vendor.patterns();
        if patterns.is_empty() {
            return Err(RuleFileError::field(&label, "vendor", "must not be empty"));
        }
        VendorFilter::new(patterns)
            .map_err(|e| RuleFileError::field(&label, "vendor", e.to_string()))?;
    }

    let depth = rule.check.depth();
    if depth > MAX_CHECK_DEPTH {
        return Err(RuleFileError::field(
            &label,
            "check",
            format!("nests {depth} levels deep (limit {MAX_CHECK_DEPTH})"),
        ));
    }
    validate_check(&label, "check", &rule.check)
}

fn validate_check(label: &str, path: &str, check: &JsonCheck) -> Result<(), RuleFileError> {
    match check {
        JsonCheck::And { conditions } | JsonCheck::Or { conditions } => {
            if conditions.is_empty() {
                return Err(RuleFileError::field(
                    label,
                    &format!("{path}.conditions"),
                    "must not be empty",
                ));
            }
            for (i, condition) in conditions.iter().enumerate() {
                validate_check(label, &format!("{path}.conditions[{i}]"), condition)?;
            }
            Ok(())
        }
        JsonCheck::Not { condition } => validate_check(label, &format!("{path}.condition"), condition),
        JsonCheck::Helper { helper, .. } if helper.trim().is_empty() => Err(RuleFileError::field(
            label,
            &format!("{path}.helper"),
            "must not be empty",
        )),
        JsonCheck::Expr { expr } if expr.trim().is_empty() => Err(RuleFileError::field(
            label,
            &format!("{path}.expr"),
            "must not be empty",
        )),
        _ => Ok(()),
    }
}
