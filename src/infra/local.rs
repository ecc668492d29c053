//! Local transport — runs probe commands on the machine vigil runs on.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt as _;

use crate::application::ports::{ExecOutput, Transport};
use crate::domain::error::ProbeError;

/// Production `Transport` for local targets — tokio process execution with
/// guaranteed timeout and kill on all platforms.
///
/// `tokio::time::timeout` around `.output().await` does not kill the child
/// when the timeout fires on Windows — the future is dropped but the OS
/// process keeps running. `tokio::select!` with an explicit `child.kill()`
/// guarantees termination.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl Transport for LocalTransport {
    async fn run(
        &self,
        argv: &[String],
        sudo: bool,
        timeout: Duration,
    ) -> Result<ExecOutput, ProbeError> {
        let mut full: Vec<&str> = Vec::with_capacity(argv.len() + 2);
        if sudo {
            // -n: never prompt; a missing sudoers entry is a probe error,
            // not a hang.
            full.extend(["sudo", "-n"]);
        }
        full.extend(argv.iter().map(String::as_str));
        let Some((program, args)) = full.split_first() else {
            return Err(ProbeError::Spawn {
                program: String::new(),
                reason: "empty argv".to_string(),
            });
        };

        tracing::debug!(command = %full.join(" "), "running local probe command");

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::Spawn {
                program: (*program).to_string(),
                reason: e.to_string(),
            })?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Read stdout/stderr CONCURRENTLY with wait() to avoid pipe
        // deadlock: a child writing more than the OS pipe buffer blocks on
        // write, and wait() alone would never resolve.
        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let status = status.map_err(|e| ProbeError::Spawn {
                    program: (*program).to_string(),
                    reason: e.to_string(),
                })?;
                Ok(ExecOutput {
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    exit_status: i64::from(status.code().unwrap_or(-1)),
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(ProbeError::Timeout(timeout))
            }
        }
    }

    fn endpoint(&self) -> String {
        "local".to_string()
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_run_captures_stdout_and_exit_status() {
        let output = LocalTransport
            .run(&argv(&["echo", "hello"]), false, Duration::from_secs(5))
            .await
            .expect("echo runs");
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.exit_status, 0);
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_is_observed_state_not_error() {
        let output = LocalTransport
            .run(&argv(&["sh", "-c", "exit 3"]), false, Duration::from_secs(5))
            .await
            .expect("sh runs");
        assert_eq!(output.exit_status, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_timeout_kills_the_child() {
        let started = std::time::Instant::now();
        let err = LocalTransport
            .run(&argv(&["sleep", "30"]), false, Duration::from_millis(100))
            .await
            .expect_err("sleep must time out");
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_missing_program_is_spawn_error() {
        let err = LocalTransport
            .run(
                &argv(&["vigil-no-such-binary-xyz"]),
                false,
                Duration::from_secs(5),
            )
            .await
            .expect_err("must not spawn");
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_run_empty_argv_is_rejected() {
        let err = LocalTransport
            .run(&[], false, Duration::from_secs(5))
            .await
            .expect_err("empty argv");
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
