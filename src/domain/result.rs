//! Probe results — a closed, typed schema per probe variant.
//!
//! Matchers address result fields by name; `field()` is the single place
//! that maps names onto the typed schema, so a suite referencing a field
//! the probe does not produce fails with `UnknownField` instead of being
//! silently treated as a pass.

use crate::domain::check::Value;
use crate::domain::error::MatchError;

/// Observed state for one probe, produced fresh per evaluation and
/// discarded after the outcome is recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    File {
        exists: bool,
        directory: bool,
        owner: Option<String>,
        group: Option<String>,
        sha256: Option<String>,
    },
    Process {
        exists: bool,
        count: i64,
        users: Vec<String>,
        ttys: Vec<String>,
    },
    Port {
        listening: bool,
        addresses: Vec<String>,
        protocols: Vec<String>,
        processes: Vec<String>,
    },
    Command {
        stdout: String,
        stderr: String,
        exit_status: i64,
    },
    Http {
        status: i64,
        body: String,
    },
    User {
        exists: bool,
        home: Option<String>,
        primary_group: Option<String>,
    },
    Service {
        installed: bool,
        enabled: bool,
        running: bool,
    },
}

impl ProbeResult {
    /// Short name of the producing probe variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeResult::File { .. } => "file",
            ProbeResult::Process { .. } => "process",
            ProbeResult::Port { .. } => "port",
            ProbeResult::Command { .. } => "command",
            ProbeResult::Http { .. } => "http",
            ProbeResult::User { .. } => "user",
            ProbeResult::Service { .. } => "service",
        }
    }

    /// Look up a named field of this result.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::UnknownField` if the field does not exist in
    /// this probe's schema.
    pub fn field(&self, name: &str) -> Result<Value, MatchError> {
        let value = match (self, name) {
            (ProbeResult::File { exists, .. }, "exists") => Some(Value::Bool(*exists)),
            (ProbeResult::File { directory, .. }, "directory") => Some(Value::Bool(*directory)),
            (ProbeResult::File { owner, .. }, "owner") => Some(owner.clone().into()),
            (ProbeResult::File { group, .. }, "group") => Some(group.clone().into()),
            (ProbeResult::File { sha256, .. }, "sha256") => Some(sha256.clone().into()),

            (ProbeResult::Process { exists, .. }, "exists") => Some(Value::Bool(*exists)),
            (ProbeResult::Process { count, .. }, "count") => Some(Value::Int(*count)),
            (ProbeResult::Process { users, .. }, "users") => Some(Value::List(users.clone())),
            (ProbeResult::Process { ttys, .. }, "ttys") => Some(Value::List(ttys.clone())),

            (ProbeResult::Port { listening, .. }, "listening") => Some(Value::Bool(*listening)),
            (ProbeResult::Port { addresses, .. }, "addresses") => {
                Some(Value::List(addresses.clone()))
            }
            (ProbeResult::Port { protocols, .. }, "protocols") => {
                Some(Value::List(protocols.clone()))
            }
            (ProbeResult::Port { processes, .. }, "processes") => {
                Some(Value::List(processes.clone()))
            }

            (ProbeResult::Command { stdout, .. }, "stdout") => Some(Value::Str(stdout.clone())),
            (ProbeResult::Command { stderr, .. }, "stderr") => Some(Value::Str(stderr.clone())),
            (ProbeResult::Command { exit_status, .. }, "exit_status") => {
                Some(Value::Int(*exit_status))
            }

            (ProbeResult::Http { status, .. }, "status") => Some(Value::Int(*status)),
            (ProbeResult::Http { body, .. }, "body") => Some(Value::Str(body.clone())),

            (ProbeResult::User { exists, .. }, "exists") => Some(Value::Bool(*exists)),
            (ProbeResult::User { home, .. }, "home") => Some(home.clone().into()),
            (ProbeResult::User { primary_group, .. }, "primary_group") => {
                Some(primary_group.clone().into())
            }

            (ProbeResult::Service { installed, .. }, "installed") => Some(Value::Bool(*installed)),
            (ProbeResult::Service { enabled, .. }, "enabled") => Some(Value::Bool(*enabled)),
            (ProbeResult::Service { running, .. }, "running") => Some(Value::Bool(*running)),

            _ => None,
        };

        value.ok_or_else(|| MatchError::UnknownField {
            probe: self.kind(),
            field: name.to_string(),
        })
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
