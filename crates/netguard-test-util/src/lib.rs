//! Shared test utilities for the netguard workspace.
//!
//! `xtask` needs these at runtime (not behind `#[cfg(test)]`), and the app and CLI tests share
//! them, so they live in their own crate.

#![forbid(unsafe_code)]

use serde_json::Value;

const ENVELOPE_KEYS: &[&str] = &["schema", "tool", "run", "verdict", "results"];
const TIMESTAMP_KEYS: &[&str] = &["started_at", "ended_at"];

pub const VERSION_PLACEHOLDER: &str = "__VERSION__";
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";

/// Replace the fields of a report that change from run to run.
///
/// `tool.version` is only replaced on a report envelope at the root, or on each envelope of a
/// root array (the batch output of `netguard check`). Rule results carry free-form messages,
/// so an envelope-shaped object further down is left alone.
///
/// Timestamps and `duration_ms` are replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    match &mut value {
        Value::Array(items) => items.iter_mut().for_each(normalize_tool_version),
        root => normalize_tool_version(root),
    }
    normalize_timestamps(&mut value);
    value
}

/// Whether `value` has every top-level key of a `netguard.report.v1` envelope.
pub fn is_report_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| ENVELOPE_KEYS.iter().all(|key| obj.contains_key(*key)))
}

fn normalize_tool_version(value: &mut Value) {
    if !is_report_envelope(value) {
        return;
    }
    if let Some(tool) = value.get_mut("tool").and_then(Value::as_object_mut)
        && tool.contains_key("version")
    {
        tool.insert(
            "version".to_string(),
            Value::String(VERSION_PLACEHOLDER.to_string()),
        );
    }
}

fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TIMESTAMP_KEYS {
                if let Some(v) = map.get_mut(*key)
                    && !v.is_null()
                {
                    *v = Value::String(TIMESTAMP_PLACEHOLDER.to_string());
                }
            }
            if let Some(v) = map.get_mut("duration_ms")
                && !v.is_null()
            {
                *v = Value::Number(0.into());
            }
            map.values_mut().for_each(normalize_timestamps);
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(version: &str) -> Value {
        json!({
            "schema": "netguard.report.v1",
            "tool": { "name": "netguard", "version": version },
            "run": { "started_at": "2026-01-01T00:00:00Z", "ended_at": "2026-01-01T00:00:01Z",
                     "duration_ms": 1000 },
            "source": { "name": "edge-1.cfg", "vendor": "cisco-ios" },
            "verdict": { "status": "pass" },
            "results": []
        })
    }

    #[test]
    fn root_envelope_is_normalized() {
        let result = normalize_nondeterministic(report("0.1.0"));
        assert_eq!(result["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result["tool"]["name"], "netguard");
        assert_eq!(result["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["ended_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["duration_ms"], 0);
        assert_eq!(result["source"]["vendor"], "cisco-ios");
    }

    #[test]
    fn each_report_of_a_batch_is_normalized() {
        let result = normalize_nondeterministic(json!([report("0.1.0"), report("0.2.0")]));
        assert_eq!(result[0]["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result[1]["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result[1]["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
    }

    #[test]
    fn nested_envelope_keeps_its_version() {
        let mut outer = report("0.1.0");
        outer["data"] = json!({ "embedded": report("9.9.9") });
        let result = normalize_nondeterministic(outer);
        assert_eq!(result["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result["data"]["embedded"]["tool"]["version"], "9.9.9");
        assert_eq!(
            result["data"]["embedded"]["run"]["started_at"],
            TIMESTAMP_PLACEHOLDER
        );
    }

    #[test]
    fn non_envelopes_only_lose_timestamps() {
        let input = json!({
            "tool": { "name": "other", "version": "2.0.0" },
            "run": { "started_at": "2026-01-01T00:00:00Z", "ended_at": null }
        });
        let result = normalize_nondeterministic(input);
        assert!(!is_report_envelope(&result));
        assert_eq!(result["tool"]["version"], "2.0.0");
        assert_eq!(result["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
        assert!(result["run"]["ended_at"].is_null());
    }
}
