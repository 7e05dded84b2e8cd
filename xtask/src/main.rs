//! Developer tasks (schema generation, fixture conformance).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_rules_schema() -> schemars::Schema {
    schema_for!(netguard_rules::JsonRuleFile)
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(netguard_types::NetguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(netguard_settings::NetguardConfigV1)
}

const RULES_SCHEMA_FILE: &str = "netguard.rules.v1.json";
const REPORT_SCHEMA_FILE: &str = "netguard.report.v1.json";

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: RULES_SCHEMA_FILE,
            generate: generate_rules_schema,
        },
        SchemaSpec {
            filename: REPORT_SCHEMA_FILE,
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "netguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that the schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate fixture rule files against netguard.rules.v1");
    eprintln!("  conform-full      conform + validate netguard reports for fixture configs");
}

fn load_validator(filename: &str) -> anyhow::Result<jsonschema::Validator> {
    let path = schemas_dir().join(filename);
    let text = fs::read_to_string(&path).with_context(|| {
        format!(
            "Failed to read {} (run `cargo xtask emit-schemas` first)",
            path.display()
        )
    })?;
    let schema: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {filename} as JSON"))?;
    jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile {filename}: {e}"))
}

fn json_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.strip_prefix(project_root())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Fixture rule files under `tests/fixtures/rules/` must satisfy the rule-file schema and load.
fn conform() -> anyhow::Result<()> {
    let validator = load_validator(RULES_SCHEMA_FILE)?;
    println!("✓ {RULES_SCHEMA_FILE} compiles");

    let files = json_files(&fixtures_dir().join("rules"))?;
    if files.is_empty() {
        bail!("No rule fixtures found in tests/fixtures/rules/");
    }

    let mut errors = Vec::new();
    for path in &files {
        let name = display_name(path);
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {name}"))?;
        let value: Value =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {name}"))?;

        let before = errors.len();
        for err in validator.iter_errors(&value) {
            errors.push(format!("{name}: schema validation: {err}"));
        }
        if let Err(err) = netguard_rules::parse_rule_file(&text) {
            errors.push(format!("{name}: rule validation: {err}"));
        }
        if errors.len() == before {
            println!("  ✓ {name} validates");
        }
    }

    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }
    println!("\n✓ All {} rule fixtures pass conformance checks!", files.len());
    Ok(())
}

/// Fixture configs are named `<host>.<vendor>.<ext>`; the middle part picks the schema.
fn fixture_vendor(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (_, vendor) = stem.rsplit_once('.')?;
    Some(vendor.to_string())
}

/// `conform` plus: run the built netguard binary over every fixture config and validate the
/// report against the report schema.
fn conform_full() -> anyhow::Result<()> {
    conform()?;

    println!("\n--- Full conformance: netguard binary output ---\n");
    let validator = load_validator(REPORT_SCHEMA_FILE)?;

    let bin = project_root().join("target").join("debug").join("netguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");
    if !bin.exists() {
        bail!(
            "netguard binary not found at {}.\nRun `cargo build -p netguard-cli` first.",
            bin.display()
        );
    }

    let configs_dir = fixtures_dir().join("configs");
    let mut errors = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(&configs_dir)
        .context("Failed to read tests/fixtures/configs/")?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    for config in &entries {
        let name = display_name(config);
        let Some(vendor) = fixture_vendor(config) else {
            println!("  - {name} skipped (no vendor in file name)");
            continue;
        };
        let temp = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp.path().join("report.json");

        let output = std::process::Command::new(&bin)
            .arg("check")
            .arg(config)
            .arg("--rules")
            .arg(fixtures_dir().join("rules"))
            .args(["--vendor", &vendor, "--report-out"])
            .arg(&report_out)
            .output()
            .with_context(|| format!("Failed to run netguard on {name}"))?;

        // 0 and 2 both mean a report was produced.
        if !matches!(output.status.code(), Some(0 | 2)) {
            errors.push(format!(
                "{name}: netguard exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ));
            continue;
        }

        let text = fs::read_to_string(&report_out)
            .with_context(|| format!("{name}: no report output generated"))?;
        let report: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse report for {name}"))?;
        for err in validator.iter_errors(&report) {
            errors.push(format!("{name}: schema validation: {err}"));
        }

        let normalized = netguard_test_util::normalize_nondeterministic(report);
        if !netguard_test_util::is_report_envelope(&normalized) {
            errors.push(format!("{name}: output is not a report envelope"));
            continue;
        }
        println!(
            "  ✓ {name} produces a valid report ({})",
            normalized["verdict"]["status"]
        );
    }

    if !errors.is_empty() {
        eprintln!("\nFull conformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Full conformance validation failed with {} errors", errors.len());
    }
    println!("\n✓ Full conformance checks passed!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "conform-full" => conform_full(),
        "print-schema-ids" => {
            println!("{}", netguard_rules::SCHEMA_RULES_V1);
            println!("{}", netguard_types::SCHEMA_REPORT_V1);
            println!("{}", netguard_settings::SCHEMA_CONFIG_V1);
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_vendor_is_the_middle_of_the_file_name() {
        assert_eq!(
            fixture_vendor(Path::new("configs/edge-1.ios.cfg")).as_deref(),
            Some("ios")
        );
        assert_eq!(
            fixture_vendor(Path::new("configs/fw-1.junos.conf")).as_deref(),
            Some("junos")
        );
        assert_eq!(fixture_vendor(Path::new("configs/plain.cfg")), None);
    }

    #[test]
    fn schemas_serialize_with_trailing_newline() {
        for spec in schema_specs() {
            let json = serialize_schema(&(spec.generate)()).expect("serialize");
            assert!(json.ends_with("}\n"), "{}", spec.filename);
        }
    }
}
