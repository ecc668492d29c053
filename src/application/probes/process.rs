//! Process probe — matching processes, their owners and controlling ttys.

use std::time::Duration;

use crate::application::ports::Transport;
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

pub(super) async fn probe<T: Transport>(
    transport: &T,
    filter: &str,
    sudo: bool,
    timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let argv = vec![
        "ps".to_string(),
        "-e".to_string(),
        "-o".to_string(),
        "user=,tty=,args=".to_string(),
    ];
    let output = transport.run(&argv, sudo, timeout).await?;
    if !output.success() {
        return Err(ProbeError::InvalidOutput(format!(
            "ps exited {}: {}",
            output.exit_status,
            output.stderr.trim()
        )));
    }
    Ok(parse_ps(&output.stdout, filter))
}

/// Filter `ps -eo user=,tty=,args=` output by command-line substring.
fn parse_ps(stdout: &str, filter: &str) -> ProbeResult {
    let mut count = 0;
    let mut users = Vec::new();
    let mut ttys = Vec::new();

    for line in stdout.lines() {
        let mut columns = line.split_whitespace();
        let (Some(user), Some(tty)) = (columns.next(), columns.next()) else {
            continue;
        };
        let args = columns.collect::<Vec<_>>().join(" ");
        if !args.contains(filter) {
            continue;
        }
        count += 1;
        push_unique(&mut users, user.to_string());
        push_unique(&mut ttys, tty.to_string());
    }

    ProbeResult::Process {
        exists: count > 0,
        count,
        users,
        ttys,
    }
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

    const PS_OUTPUT: &str = "\
root     ?        /usr/sbin/sshd -D
root     tty1     python3 /usr/bin/deskpro-vm-config
deskpro  ?        php-fpm: pool www
deskpro  ?        php-fpm: pool www
";

    #[test]
    fn test_parse_ps_matches_by_command_line() {
        let ProbeResult::Process { exists, count, users, ttys } =
            parse_ps(PS_OUTPUT, "python3 /usr/bin/deskpro-vm-config")
        else {
            panic!("expected a process result");
        };
        assert!(exists);
        assert_eq!(count, 1);
        assert_eq!(users, ["root"]);
        assert_eq!(ttys, ["tty1"]);
    }

    #[test]
    fn test_parse_ps_dedupes_users_across_matches() {
        let ProbeResult::Process { count, users, .. } = parse_ps(PS_OUTPUT, "php-fpm") else {
            panic!("expected a process result");
        };
        assert_eq!(count, 2);
        assert_eq!(users, ["deskpro"]);
    }

    #[test]
    fn test_parse_ps_no_match_means_not_existing() {
        let ProbeResult::Process { exists, count, users, ttys } = parse_ps(PS_OUTPUT, "mongod")
        else {
            panic!("expected a process result");
        };
        assert!(!exists);
        assert_eq!(count, 0);
        assert!(users.is_empty());
        assert!(ttys.is_empty());
    }
}
