//! SSH transport — runs probe commands on a remote target through the
//! system `ssh` client in batch mode.

use std::time::Duration;

use crate::application::ports::{ExecOutput, Transport};
use crate::domain::config::SshConfig;
use crate::domain::error::ProbeError;
use crate::infra::local::LocalTransport;

/// `ssh` exits 255 on connection or authentication failure; remote command
/// exit codes pass through unchanged.
const SSH_CONNECTION_FAILURE: i64 = 255;

/// Production `Transport` for remote targets.
///
/// The remote command is shell-quoted and joined into a single argument, so
/// probe argv semantics survive the remote shell. Sudo escalation happens
/// on the remote side (`sudo -n` prefix), per-check.
pub struct SshTransport {
    host: String,
    user: Option<String>,
    port: Option<u16>,
    config: SshConfig,
    local: LocalTransport,
}

impl SshTransport {
    #[must_use]
    pub fn new(host: String, user: Option<String>, port: Option<u16>, config: SshConfig) -> Self {
        Self {
            host,
            user,
            port,
            config,
            local: LocalTransport,
        }
    }

    fn ssh_argv(&self, remote_command: &str) -> Vec<String> {
        let mut argv = vec![
            "ssh".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.config.connect_timeout_secs),
        ];
        if let Some(port) = self.port.or(self.config.port) {
            argv.push("-p".to_string());
            argv.push(port.to_string());
        }
        if let Some(identity) = &self.config.identity {
            argv.push("-i".to_string());
            argv.push(identity.display().to_string());
        }
        let login = match self.user.as_ref().or(self.config.user.as_ref()) {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        };
        argv.push(login);
        argv.push("--".to_string());
        argv.push(remote_command.to_string());
        argv
    }
}

impl Transport for SshTransport {
    async fn run(
        &self,
        argv: &[String],
        sudo: bool,
        timeout: Duration,
    ) -> Result<ExecOutput, ProbeError> {
        let mut remote = shell_join(argv);
        if sudo {
            remote = format!("sudo -n {remote}");
        }
        let ssh_argv = self.ssh_argv(&remote);

        // Budget for connection setup on top of the probe's own deadline.
        let ssh_timeout = timeout + Duration::from_secs(self.config.connect_timeout_secs);
        let output = self.local.run(&ssh_argv, false, ssh_timeout).await?;

        if output.exit_status == SSH_CONNECTION_FAILURE {
            return Err(ProbeError::Unreachable(format!(
                "ssh to {}: {}",
                self.endpoint(),
                output.stderr.trim()
            )));
        }
        Ok(output)
    }

    fn endpoint(&self) -> String {
        let mut endpoint = String::new();
        if let Some(user) = self.user.as_ref().or(self.config.user.as_ref()) {
            endpoint.push_str(user);
            endpoint.push('@');
        }
        endpoint.push_str(&self.host);
        if let Some(port) = self.port.or(self.config.port) {
            endpoint.push(':');
            endpoint.push_str(&port.to_string());
        }
        endpoint
    }
}

// ── Shell quoting ─────────────────────────────────────────────────────────────

/// Join argv into one shell word sequence safe for the remote shell.
#[must_use]
pub fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote one argument for POSIX sh.
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
