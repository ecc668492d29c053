//! Probe interface — uniform execution of heterogeneous checks.
//!
//! Each probe variant is a thin argv builder plus a pure output parser, so
//! parsing is unit-testable with canned command output. `ProbeRunner` owns
//! the dispatch, the per-probe timeout, and bounded probe-internal retries.

pub mod file;
pub mod port;
pub mod process;
pub mod service;
pub mod user;

use std::time::Duration;

use crate::application::ports::{HttpClient, Transport};
use crate::domain::check::ProbeSpec;
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

/// Executes probes against one target through injected transports.
pub struct ProbeRunner<T, H> {
    transport: T,
    http: H,
    probe_timeout: Duration,
}

impl<T: Transport, H: HttpClient> ProbeRunner<T, H> {
    #[must_use]
    pub fn new(transport: T, http: H, probe_timeout: Duration) -> Self {
        Self {
            transport,
            http,
            probe_timeout,
        }
    }

    /// The transport's endpoint description, for reports and logs.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    /// Execute a probe, retrying up to `retries` extra attempts on probe
    /// failure. Retries are a probe-internal concern: the evaluator only
    /// ever sees the final result.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's `ProbeError` once retries are exhausted.
    pub async fn execute(
        &self,
        spec: &ProbeSpec,
        sudo: bool,
        retries: u32,
    ) -> Result<ProbeResult, ProbeError> {
        let mut attempt = 0;
        loop {
            match self.execute_once(spec, sudo).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    tracing::debug!(
                        probe = spec.kind(),
                        subject = %spec.subject(),
                        error = %e,
                        attempt,
                        "probe failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_once(&self, spec: &ProbeSpec, sudo: bool) -> Result<ProbeResult, ProbeError> {
        match spec {
            ProbeSpec::File(path) => {
                file::probe(&self.transport, path, sudo, self.probe_timeout).await
            }
            ProbeSpec::Port(number) => {
                port::probe(&self.transport, *number, sudo, self.probe_timeout).await
            }
            ProbeSpec::Process(filter) => {
                process::probe(&self.transport, filter, sudo, self.probe_timeout).await
            }
            ProbeSpec::User(name) => {
                user::probe(&self.transport, name, sudo, self.probe_timeout).await
            }
            ProbeSpec::Service(name) => {
                service::probe(&self.transport, name, sudo, self.probe_timeout).await
            }
            ProbeSpec::Command(argv) => {
                let output = self.transport.run(argv, sudo, self.probe_timeout).await?;
                Ok(ProbeResult::Command {
                    stdout: output.stdout,
                    stderr: output.stderr,
                    exit_status: output.exit_status,
                })
            }
            ProbeSpec::Http(url) => {
                let response = self.http.get(url, self.probe_timeout).await?;
                Ok(ProbeResult::Http {
                    status: response.status,
                    body: response.body,
                })
            }
        }
    }

    /// Identify the target platform (`centos`, `debian`, `ubuntu`, …) from
    /// `/etc/os-release`. Called once per run, before platform-keyed
    /// expected values are resolved.
    ///
    /// # Errors
    ///
    /// Returns a `ProbeError` if the file cannot be read or carries no `ID`.
    pub async fn detect_platform(&self) -> Result<String, ProbeError> {
        let argv = vec!["cat".to_string(), "/etc/os-release".to_string()];
        let output = self.transport.run(&argv, false, self.probe_timeout).await?;
        if !output.success() {
            return Err(ProbeError::InvalidOutput(format!(
                "cannot read /etc/os-release: {}",
                output.stderr.trim()
            )));
        }
        parse_os_release(&output.stdout).ok_or_else(|| {
            ProbeError::InvalidOutput("no ID field in /etc/os-release".to_string())
        })
    }
}

/// Extract the `ID=` value from os-release content.
#[must_use]
pub fn parse_os_release(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.strip_prefix("ID=")?.trim();
        let value = value.trim_matches('"').trim_matches('\'');
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

// ── Unit tests ────────────────────────────────────────────────────────────────
