//! Service probe — systemd unit install/enable/run state.

use std::time::Duration;

use crate::application::ports::{ExecOutput, Transport};
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

/// `systemctl is-enabled` exits 4 when the unit file does not exist.
const SYSTEMCTL_NO_SUCH_UNIT: i64 = 4;

pub(super) async fn probe<T: Transport>(
    transport: &T,
    name: &str,
    sudo: bool,
    timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let argv = vec![
        "systemctl".to_string(),
        "is-enabled".to_string(),
        name.to_string(),
    ];
    let enabled = transport.run(&argv, sudo, timeout).await?;

    let argv = vec![
        "systemctl".to_string(),
        "is-active".to_string(),
        name.to_string(),
    ];
    let active = transport.run(&argv, sudo, timeout).await?;

    Ok(service_facts(&enabled, &active))
}

/// Interpret the pair of `systemctl` results.
fn service_facts(enabled: &ExecOutput, active: &ExecOutput) -> ProbeResult {
    let enabled_state = enabled.stdout.trim();
    let installed = enabled.exit_status != SYSTEMCTL_NO_SUCH_UNIT
        && enabled_state != "not-found"
        && !enabled.stderr.contains("No such file");

    ProbeResult::Service {
        installed,
        enabled: enabled_state.starts_with("enabled"),
        running: active.stdout.trim() == "active",
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str, exit_status: i64) -> ExecOutput {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_status,
        }
    }

    #[test]
    fn test_enabled_and_running_service() {
        let result = service_facts(&output("enabled\n", "", 0), &output("active\n", "", 0));
        assert_eq!(
            result,
            ProbeResult::Service {
                installed: true,
                enabled: true,
                running: true,
            }
        );
    }

    #[test]
    fn test_disabled_but_installed_service() {
        let result = service_facts(&output("disabled\n", "", 1), &output("inactive\n", "", 3));
        assert_eq!(
            result,
            ProbeResult::Service {
                installed: true,
                enabled: false,
                running: false,
            }
        );
    }

    #[test]
    fn test_missing_unit_is_not_installed() {
        let enabled = output(
            "",
            "Failed to get unit file state for ghost.service: No such file or directory\n",
            SYSTEMCTL_NO_SUCH_UNIT,
        );
        let result = service_facts(&enabled, &output("inactive\n", "", 3));
        assert_eq!(
            result,
            ProbeResult::Service {
                installed: false,
                enabled: false,
                running: false,
            }
        );
    }

    #[test]
    fn test_enabled_runtime_counts_as_enabled() {
        let result = service_facts(&output("enabled-runtime\n", "", 0), &output("active\n", "", 0));
        let ProbeResult::Service { enabled, .. } = result else {
            panic!("expected a service result");
        };
        assert!(enabled);
    }
}
