//! User probe — account existence, home directory, primary group.

use std::time::Duration;

use crate::application::ports::Transport;
use crate::domain::error::ProbeError;
use crate::domain::result::ProbeResult;

pub(super) async fn probe<T: Transport>(
    transport: &T,
    name: &str,
    sudo: bool,
    timeout: Duration,
) -> Result<ProbeResult, ProbeError> {
    let argv = vec!["getent".to_string(), "passwd".to_string(), name.to_string()];
    let passwd = transport.run(&argv, sudo, timeout).await?;
    if !passwd.success() {
        return Ok(ProbeResult::User {
            exists: false,
            home: None,
            primary_group: None,
        });
    }
    let home = parse_passwd_home(&passwd.stdout)?;

    let argv = vec!["id".to_string(), "-gn".to_string(), name.to_string()];
    let group = transport.run(&argv, sudo, timeout).await?;
    let primary_group = if group.success() {
        Some(group.stdout.trim().to_string())
    } else {
        None
    };

    Ok(ProbeResult::User {
        exists: true,
        home: Some(home),
        primary_group,
    })
}

/// Extract the home directory (6th field) from a passwd entry.
fn parse_passwd_home(stdout: &str) -> Result<String, ProbeError> {
    let line = stdout.lines().next().unwrap_or("").trim();
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 6 {
        return Err(ProbeError::InvalidOutput(format!(
            "malformed passwd entry: {line:?}"
        )));
    }
    Ok(fields[5].to_string())
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passwd_home() {
        let entry = "deskpro:x:1001:1001:Deskpro:/home/deskpro:/bin/bash\n";
        assert_eq!(parse_passwd_home(entry).expect("parse"), "/home/deskpro");
    }

    #[test]
    fn test_parse_passwd_home_empty_shell_field() {
        // Trailing empty field is still a valid 7-field entry.
        let entry = "daemon:x:1:1:daemon:/usr/sbin:\n";
        assert_eq!(parse_passwd_home(entry).expect("parse"), "/usr/sbin");
    }

    #[test]
    fn test_parse_passwd_malformed_is_invalid_output() {
        assert!(parse_passwd_home("not-a-passwd-line\n").is_err());
    }
}
