//! Domain types for vigil configuration.
//!
//! Pure schema only — loading lives in `infra::config`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `~/.vigil/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    /// Evaluation defaults, overridable per invocation via CLI flags.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// SSH transport options.
    #[serde(default)]
    pub ssh: SshConfig,
}

/// Evaluation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Worker limit for concurrent check evaluation.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Run-level timeout in seconds; `None` means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Per-probe timeout in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: None,
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

fn default_probe_timeout_secs() -> u64 {
    30
}

/// SSH transport options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Login user when the target does not name one.
    pub user: Option<String>,
    /// Port when the target does not name one.
    pub port: Option<u16>,
    /// Identity file passed as `-i`.
    pub identity: Option<PathBuf>,
    /// `ConnectTimeout` in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: None,
            port: None,
            identity: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

// ── Unit tests ────────────────────────────────────────────────────────────────
