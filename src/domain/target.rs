//! Target designation — where probes execute.

use std::fmt;

/// Parsed `--target` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Probes run on the machine vigil itself runs on.
    Local,
    /// Probes run over SSH.
    Ssh {
        host: String,
        user: Option<String>,
        port: Option<u16>,
    },
}

impl Target {
    /// Parse a target designation.
    ///
    /// Accepted forms: `local`, `host`, `user@host`, `ssh://host`,
    /// `ssh://user@host:port`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the malformed component.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("target must not be empty".to_string());
        }
        if trimmed == "local" {
            return Ok(Target::Local);
        }

        let rest = trimmed.strip_prefix("ssh://").unwrap_or(trimmed);
        let (user, hostport) = match rest.split_once('@') {
            Some((user, hostport)) => {
                if user.is_empty() {
                    return Err(format!("empty user in target '{input}'"));
                }
                (Some(user.to_string()), hostport)
            }
            None => (None, rest),
        };

        let (host, port) = match hostport.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| format!("invalid port '{port}' in target '{input}'"))?;
                (host, Some(port))
            }
            None => (hostport, None),
        };
        if host.is_empty() {
            return Err(format!("empty host in target '{input}'"));
        }

        Ok(Target::Ssh {
            host: host.to_string(),
            user,
            port,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local => write!(f, "local"),
            Target::Ssh { host, user, port } => {
                if let Some(user) = user {
                    write!(f, "{user}@")?;
                }
                write!(f, "{host}")?;
                if let Some(port) = port {
                    write!(f, ":{port}")?;
                }
                Ok(())
            }
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
