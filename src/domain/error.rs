//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

// ── Probe errors ──────────────────────────────────────────────────────────────

/// Failures of the probe itself, as opposed to assertion mismatches.
///
/// Every variant is caught per-check by the evaluator and converted to an
/// Error outcome — a probe failure never aborts the run.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("probe timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("cannot execute '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("unexpected probe output: {0}")]
    InvalidOutput(String),
}

// ── Matcher errors ────────────────────────────────────────────────────────────

/// Failures of matcher application, distinct from a plain mismatch.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown field '{field}' for {probe} probe")]
    UnknownField { probe: &'static str, field: String },

    #[error("{0}")]
    TypeMismatch(String),

    #[error("per-platform expected value was not resolved before evaluation")]
    UnresolvedExpected,
}

// ── Suite errors ──────────────────────────────────────────────────────────────

/// Structural errors in a check suite. Fatal at startup, before any check
/// executes.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("duplicate check name '{0}'")]
    DuplicateCheck(String),

    #[error("suite contains no checks")]
    Empty,

    #[error("check '{check}' has no assertions")]
    NoAssertions { check: String },

    #[error("check '{check}', field '{field}': no expected value for platform '{platform}'")]
    UnresolvedPlatform {
        check: String,
        field: String,
        platform: String,
    },
}
