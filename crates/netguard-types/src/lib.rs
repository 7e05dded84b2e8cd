//! Stable DTOs and IDs used across the netguard workspace.
//!
//! This crate is intentionally boring:
//! - severities and source locations shared by the parser and the engine
//! - the per-(rule, node) `RuleResult` record
//! - the JSON report envelope emitted by the app layer
//! - stable string IDs and codes

#![forbid(unsafe_code)]

pub mod ids;
pub mod receipt;

pub use receipt::{
    NetguardData, NetguardReport, ReportEnvelope, RuleResult, RunMeta, SCHEMA_REPORT_V1, Severity,
    SourceLoc, SourceMeta, ToolMeta, Verdict, VerdictCounts, VerdictStatus, VerdictSummary,
};
