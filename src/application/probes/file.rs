//! File probe — existence, kind, ownership, and content digest of a path.

use std::time::Duration;

use crate::application::ports::Transport;
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

/// Field separator for the stat format string; `|` never appears in the
/// file type, owner, or group names.
const STAT_FORMAT: &str = "%F|%U|%G";

pub(super) async fn probe<T: Transport>(
    transport: &T,
    path: &str,
    sudo: bool,
    timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let argv = vec![
        "stat".to_string(),
        "-c".to_string(),
        STAT_FORMAT.to_string(),
        path.to_string(),
    ];
    let stat = transport.run(&argv, sudo, timeout).await?;
    if !stat.success() {
        return Ok(ProbeResult::File {
            exists: false,
            directory: false,
            owner: None,
            group: None,
            sha256: None,
        });
    }
    let (directory, owner, group) = parse_stat(&stat.stdout)?;

    // The digest is observed unconditionally; it stays None for paths
    // sha256sum cannot read (directories, sockets).
    let argv = vec!["sha256sum".to_string(), path.to_string()];
    let digest = transport.run(&argv, sudo, timeout).await?;
    let sha256 = if digest.success() {
        parse_sha256(&digest.stdout)
    } else {
        None
    };

    Ok(ProbeResult::File {
        exists: true,
        directory,
        owner: Some(owner),
        group: Some(group),
        sha256,
    })
}

/// Parse `stat -c '%F|%U|%G'` output into (directory, owner, group).
fn parse_stat(stdout: &str) -> Result<(bool, String, String), ProbeError> {
    let line = stdout.trim();
    let mut parts = line.splitn(3, '|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(owner), Some(group)) if !kind.is_empty() => Ok((
            kind == "directory",
            owner.to_string(),
            group.to_string(),
        )),
        _ => Err(ProbeError::InvalidOutput(format!(
            "malformed stat output: {line:?}"
        ))),
    }
}

/// First token of `sha256sum` output.
fn parse_sha256(stdout: &str) -> Option<String> {
    stdout
        .split_whitespace()
        .next()
        .filter(|t| t.len() == 64)
        .map(str::to_string)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
