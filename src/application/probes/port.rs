//! Port probe — listening sockets, bound addresses, and owning processes.
//!
//! Built on `ss` because its column layout is stable across the distros the
//! original suites target. Process names require the probe to run privileged
//! on most hosts (`sudo: true` on the check).

use std::time::Duration;

use regex::Regex;

use crate::application::ports::Transport;
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

pub(super) async fn probe<T: Transport>(
    transport: &T,
    number: u16,
    sudo: bool,
    timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let argv = vec!["ss".to_string(), "-tulnp".to_string()];
    let output = transport.run(&argv, sudo, timeout).await?;
    if !output.success() {
        return Err(ProbeError::InvalidOutput(format!(
            "ss exited {}: {}",
            output.exit_status,
            output.stderr.trim()
        )));
    }
    Ok(parse_ss(&output.stdout, number))
}

/// Collect listening-socket facts for one port from `ss -tulnp` output.
fn parse_ss(stdout: &str, want: u16) -> ProbeResult {
    let mut addresses = Vec::new();
    let mut protocols = Vec::new();
    let mut processes = Vec::new();

    for line in stdout.lines() {
        let mut columns = line.split_whitespace();
        let Some(netid) = columns.next() else { continue };
        if netid == "Netid" {
            continue; // header
        }
        // Netid State Recv-Q Send-Q Local:Port Peer:Port [Process]
        let Some(local) = columns.nth(3) else { continue };
        let Some((address, port)) = split_local_address(local) else {
            continue;
        };
        if port != want {
            continue;
        }

        push_unique(&mut addresses, address);
        push_unique(&mut protocols, netid.to_string());
        for name in process_names(line) {
            push_unique(&mut processes, name);
        }
    }

    ProbeResult::Port {
        listening: !addresses.is_empty(),
        addresses,
        protocols,
        processes,
    }
}

/// Split an `ss` local address column into (address, port).
///
/// Normalizes `[::]` to `::`, `*` to `0.0.0.0`, and strips interface
/// scopes like `%lo`.
fn split_local_address(local: &str) -> Option<(String, u16)> {
    let (address, port) = local.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    let address = address.trim_start_matches('[').trim_end_matches(']');
    let address = address.split('%').next().unwrap_or(address);
    let address = if address == "*" { "0.0.0.0" } else { address };
    Some((address.to_string(), port))
}

/// Extract process names from the `users:(("nginx",pid=1,fd=6),…)` column.
fn process_names(line: &str) -> Vec<String> {
    let Some(start) = line.find("users:(") else {
        return Vec::new();
    };
    #[allow(clippy::expect_used)] // the pattern is a compile-time constant
    let re = Regex::new("\"([^\"]+)\"").expect("valid pattern");
    re.captures_iter(&line[start..])
        .map(|c| c[1].to_string())
        .collect()
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SS_OUTPUT: &str = "\
Netid  State   Recv-Q  Send-Q   Local Address:Port    Peer Address:Port  Process
udp    UNCONN  0       0        127.0.0.53%lo:53           0.0.0.0:*      users:((\"systemd-resolve\",pid=337,fd=13))
tcp    LISTEN  0       511            0.0.0.0:80           0.0.0.0:*      users:((\"nginx\",pid=812,fd=6),(\"nginx\",pid=811,fd=6))
tcp    LISTEN  0       70           127.0.0.1:3306         0.0.0.0:*      users:((\"mysqld\",pid=901,fd=21))
tcp    LISTEN  0       511               [::]:80              [::]:*      users:((\"nginx\",pid=812,fd=7),(\"nginx\",pid=811,fd=7))
";

    #[test]
    fn test_parse_ss_nginx_on_all_interfaces() {
        let ProbeResult::Port {
            listening,
            addresses,
            protocols,
            processes,
        } = parse_ss(SS_OUTPUT, 80)
        else {
            panic!("expected a port result");
        };
        assert!(listening);
        assert_eq!(addresses, ["0.0.0.0", "::"]);
        assert_eq!(protocols, ["tcp"]);
        assert_eq!(processes, ["nginx"]);
    }

    #[test]
    fn test_parse_ss_mysql_loopback_only() {
        let ProbeResult::Port {
            listening,
            addresses,
            processes,
            ..
        } = parse_ss(SS_OUTPUT, 3306)
        else {
            panic!("expected a port result");
        };
        assert!(listening);
        assert_eq!(addresses, ["127.0.0.1"]);
        assert_eq!(processes, ["mysqld"]);
    }

    #[test]
    fn test_parse_ss_closed_port_is_not_listening() {
        let ProbeResult::Port { listening, addresses, .. } = parse_ss(SS_OUTPUT, 8080) else {
            panic!("expected a port result");
        };
        assert!(!listening);
        assert!(addresses.is_empty());
    }

    #[test]
    fn test_parse_ss_udp_scope_suffix_stripped() {
        let ProbeResult::Port { listening, addresses, protocols, .. } = parse_ss(SS_OUTPUT, 53)
        else {
            panic!("expected a port result");
        };
        assert!(listening);
        assert_eq!(addresses, ["127.0.0.53"]);
        assert_eq!(protocols, ["udp"]);
    }

    #[test]
    fn test_split_local_address_wildcard_forms() {
        assert_eq!(
            split_local_address("*:111").expect("wildcard"),
            ("0.0.0.0".to_string(), 111)
        );
        assert_eq!(
            split_local_address("[::]:80").expect("v6 any"),
            ("::".to_string(), 80)
        );
    }
}
