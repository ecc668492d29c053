//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::time::Duration;

use crate::domain::error::ProbeError;

// ── Transport port ────────────────────────────────────────────────────────────

/// Captured output of a command executed on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i64,
}

impl ExecOutput {
    /// Whether the command exited zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Abstracts command execution on the target host so the core never manages
/// connection setup/teardown. Production implementations run locally or over
/// SSH; test doubles return canned results without spawning processes.
///
/// `sudo` escalates the command on the target — callers must treat any
/// probe that sets it as a privileged operation.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Run `argv` on the target and capture its output.
    ///
    /// # Errors
    ///
    /// Returns `Unreachable` if the target cannot be contacted, `Timeout`
    /// if the command exceeds `timeout` (the process must be killed, not
    /// left orphaned), and `Spawn` if it cannot start at all. A non-zero
    /// exit is NOT an error — it is observed state.
    async fn run(
        &self,
        argv: &[String],
        sudo: bool,
        timeout: Duration,
    ) -> Result<ExecOutput, ProbeError>;

    /// Human-readable endpoint description, e.g. `local` or `deploy@web-01`.
    fn endpoint(&self) -> String;
}

// ── HTTP port ─────────────────────────────────────────────────────────────────

/// Response of an HTTP GET probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: i64,
    pub body: String,
}

/// Abstracts HTTP fetching so the http probe can be tested without a server.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    /// Issue a GET and return status and body. Non-2xx statuses are
    /// observed state, not errors.
    ///
    /// # Errors
    ///
    /// Returns `Unreachable` on connection failure and `Timeout` when no
    /// response arrives within `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ProbeError>;
}

// ── Progress reporting port ───────────────────────────────────────────────────

/// Abstracts progress reporting so command flows can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
