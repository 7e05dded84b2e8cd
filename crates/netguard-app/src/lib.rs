//! Use case orchestration for netguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, parser,
//! rule and engine crates. It is IO-free; callers hand in file contents and receive reports.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod eval;
mod parse;
mod report;
mod rules;
mod vendors;

pub use check::{
    BatchInput, BatchOutput, CheckInput, CheckOutput, CheckSession, SourceInput, run_batch,
    run_check, verdict_exit_code,
};
pub use eval::{EvalInput, EvalMatch, EvalOutput, run_eval};
pub use parse::{ParseInput, ParseOutput, run_parse};
pub use report::{parse_report_json, report_verdict, runtime_error_report, serialize_report};
pub use rules::{RuleFileReport, RuleSource, ValidateOutput, load_rules, run_validate_rules};
pub use vendors::{VendorEntry, VendorOrigin, run_vendors};
