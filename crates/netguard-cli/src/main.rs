//! CLI entry point for netguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging setup and exit
//! codes. All business logic lives in the `netguard-app` crate.

#![forbid(unsafe_code)]

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use netguard_app::{
    BatchInput, EvalInput, ParseInput, RuleSource, SourceInput, VendorOrigin, run_batch,
    run_eval, run_parse, run_validate_rules, run_vendors, runtime_error_report,
    serialize_report, verdict_exit_code,
};
use netguard_settings::Overrides;
use netguard_types::{NetguardReport, VerdictStatus};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const EXIT_RUNTIME_ERROR: i32 = 1;
const EXIT_POLICY_FAILURE: i32 = 2;
const LOG_ENV: &str = "NETGUARD_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "netguard",
    version,
    about = "Compliance checks for multi-vendor network device configurations"
)]
struct Cli {
    /// Path to netguard config TOML (a missing default file is allowed).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override profile (strict|default|audit).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Schema used to parse inputs (preset name, alias or [schemas] entry).
    #[arg(long, global = true)]
    vendor: Option<String>,

    /// Override maximum results to emit per input.
    #[arg(long, global = true)]
    max_results: Option<u32>,

    /// Override the failure threshold (error|warning|never).
    #[arg(long, global = true)]
    fail_on: Option<String>,

    /// Log filter (e.g. `debug`, `netguard_expr=trace`); defaults to $NETGUARD_LOG, then `warn`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check configurations against rule files and write JSON reports.
    Check {
        /// Device configuration files.
        #[arg(required = true)]
        inputs: Vec<Utf8PathBuf>,

        /// Rule files, or directories searched for `*.json` rule files.
        #[arg(long, short, required = true)]
        rules: Vec<Utf8PathBuf>,

        /// Where to write the JSON report (stdout when omitted).
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,
    },

    /// Parse a configuration and print its tree.
    Parse {
        input: Utf8PathBuf,

        #[arg(long, value_enum, default_value_t = ParseFormat::Outline)]
        format: ParseFormat,
    },

    /// Validate rule files without running them.
    ValidateRules {
        /// Rule files, or directories searched for `*.json` rule files.
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },

    /// Evaluate an expression against the nodes of a configuration.
    Eval {
        expr: String,

        input: Utf8PathBuf,

        /// Only evaluate nodes matching this selector.
        #[arg(long)]
        selector: Option<String>,

        /// Print JSON instead of one line per node.
        #[arg(long)]
        json: bool,
    },

    /// List the vendor schemas inputs can be parsed with.
    Vendors {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ParseFormat {
    Outline,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match &cli.cmd {
        Commands::Check {
            inputs,
            rules,
            report_out,
        } => cmd_check(&cli, inputs, rules, report_out.as_deref()),
        Commands::Parse { input, format } => cmd_parse(&cli, input, *format),
        Commands::ValidateRules { paths } => cmd_validate_rules(paths),
        Commands::Eval {
            expr,
            input,
            selector,
            json,
        } => cmd_eval(&cli, expr, input, selector.as_deref(), *json),
        Commands::Vendors { json } => cmd_vendors(&cli, *json),
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // A second init only happens in tests; the first subscriber wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile.clone(),
            vendor: self.vendor.clone(),
            max_results: self.max_results,
            fail_on: self.fail_on.clone(),
        }
    }

    /// Config file contents; empty when no `--config` was given and `netguard.toml` is absent.
    fn config_text(&self) -> anyhow::Result<String> {
        match &self.config {
            Some(path) => {
                std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
            }
            None => Ok(std::fs::read_to_string("netguard.toml").unwrap_or_default()),
        }
    }
}

fn cmd_check(
    cli: &Cli,
    inputs: &[Utf8PathBuf],
    rules: &[Utf8PathBuf],
    report_out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<(Vec<NetguardReport>, i32)> {
        let config_text = cli.config_text()?;
        let rule_sources = read_rule_sources(rules)?;
        let sources = inputs
            .iter()
            .map(|path| read_source(path))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let output = run_batch(BatchInput {
            config_text: &config_text,
            overrides: cli.overrides(),
            rules: &rule_sources,
            sources: &sources,
        })?;
        for report in &output.reports {
            eprintln!("netguard: {}", summary_line(report));
        }
        Ok((output.reports, verdict_exit_code(output.verdict)))
    })();

    match result {
        Ok((reports, code)) => {
            write_reports(report_out, &reports)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let source = match inputs {
                [single] => Some(single.as_str()),
                _ => None,
            };
            let report = runtime_error_report(source, &format!("{err:#}"));
            if let Err(write_err) = write_reports(report_out, &[report]) {
                debug!(error = %write_err, "could not write runtime error report");
            }
            eprintln!("netguard error: {err:#}");
            std::process::exit(EXIT_RUNTIME_ERROR);
        }
    }
}

fn summary_line(report: &NetguardReport) -> String {
    let status = match report.verdict.status {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Warn => "warn",
        VerdictStatus::Fail => "fail",
        VerdictStatus::Skip => "skip",
    };
    let counts = &report.verdict.counts;
    format!(
        "{}: {status} ({} passed, {} error, {} warning, {} info)",
        report.source.name, counts.passed, counts.error, counts.warning, counts.info
    )
}

/// One input writes a single report object; several write an array in input order.
fn write_reports(path: Option<&Utf8Path>, reports: &[NetguardReport]) -> anyhow::Result<()> {
    let mut data = match reports {
        [report] => serialize_report(report)?,
        _ => serde_json::to_vec_pretty(reports).context("serialize reports")?,
    };
    data.push(b'\n');
    match path {
        Some(path) => write_file(path, &data).context("write report json"),
        None => {
            print!("{}", String::from_utf8_lossy(&data));
            Ok(())
        }
    }
}

fn write_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data).with_context(|| format!("write: {path}"))
}

fn read_source(path: &Utf8Path) -> anyhow::Result<SourceInput> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read input: {path}"))?;
    Ok(SourceInput::new(path.as_str(), text))
}

/// Rule files named directly, plus every `*.json` below named directories in path order.
fn read_rule_sources(paths: &[Utf8PathBuf]) -> anyhow::Result<Vec<RuleSource>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walk rule directory: {path}"))?;
                let Some(file) = Utf8Path::from_path(entry.path()) else {
                    debug!(path = %entry.path().display(), "skipping non-UTF-8 path");
                    continue;
                };
                if entry.file_type().is_file() && file.extension() == Some("json") {
                    sources.push(read_rule_source(file)?);
                }
            }
        } else {
            sources.push(read_rule_source(path)?);
        }
    }
    anyhow::ensure!(!sources.is_empty(), "no rule files found");
    Ok(sources)
}

fn read_rule_source(path: &Utf8Path) -> anyhow::Result<RuleSource> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read rules: {path}"))?;
    Ok(RuleSource::new(path.as_str(), text))
}

fn cmd_parse(cli: &Cli, input: &Utf8Path, format: ParseFormat) -> anyhow::Result<()> {
    let config_text = cli.config_text()?;
    let source = read_source(input)?;
    let output = run_parse(ParseInput {
        config_text: &config_text,
        overrides: cli.overrides(),
        source: &source,
    })?;
    match format {
        ParseFormat::Outline => print!("{}", netguard_model::outline(&output.forest)),
        ParseFormat::Json => {
            let json =
                serde_json::to_string_pretty(&output.forest).context("serialize parse tree")?;
            println!("{json}");
        }
    }
    eprintln!(
        "netguard: {}: {} nodes ({})",
        source.name,
        output.node_count(),
        output.vendor
    );
    Ok(())
}

fn cmd_validate_rules(paths: &[Utf8PathBuf]) -> anyhow::Result<()> {
    let sources = read_rule_sources(paths)?;
    let output = run_validate_rules(&sources);
    for file in &output.files {
        match (&file.error, file.rules) {
            (Some(error), _) => println!("error {}: {error}", file.name),
            (None, Some(count)) => println!("ok    {} ({count} rules)", file.name),
            (None, None) => println!("ok    {}", file.name),
        }
        for warning in &file.warnings {
            println!("warn  {}: {warning}", file.name);
        }
    }
    if !output.is_valid() {
        std::process::exit(EXIT_POLICY_FAILURE);
    }
    Ok(())
}

fn cmd_eval(
    cli: &Cli,
    expr: &str,
    input: &Utf8Path,
    selector: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config_text = cli.config_text()?;
    let source = read_source(input)?;
    let output = run_eval(EvalInput {
        config_text: &config_text,
        overrides: cli.overrides(),
        expr,
        source: &source,
        selector,
    })?;
    if json {
        let text = serde_json::to_string_pretty(&output).context("serialize eval output")?;
        println!("{text}");
        return Ok(());
    }
    for m in &output.matches {
        let result = match (m.result, &m.error) {
            (Some(value), _) => value.to_string(),
            (None, Some(error)) => format!("error: {error}"),
            (None, None) => "error".to_string(),
        };
        println!("{}:{}\t{}\t{result}", m.loc.line, m.loc.col, m.node_id);
    }
    Ok(())
}

fn cmd_vendors(cli: &Cli, json: bool) -> anyhow::Result<()> {
    let config_text = cli.config_text()?;
    let entries = run_vendors(&config_text)?;
    if json {
        let text = serde_json::to_string_pretty(&entries).context("serialize vendors")?;
        println!("{text}");
        return Ok(());
    }
    for entry in &entries {
        let origin = match entry.origin {
            VendorOrigin::Preset => "preset",
            VendorOrigin::Config => "config",
        };
        println!("{:<20} {:<9} {origin}", entry.name, entry.style);
    }
    Ok(())
}
