//! Suite file loading — YAML on disk to a validated `Suite`.
//!
//! Any problem here is fatal at startup, before a single check executes;
//! errors carry the offending check's identity (or the YAML location from
//! `serde_yaml`) so the suite author can find the line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};

use crate::domain::check::Check;
use crate::domain::suite::Suite;

/// On-disk suite document.
#[derive(Debug, Deserialize)]
struct SuiteDoc {
    /// Optional display name; defaults to the file stem.
    name: Option<String>,
    #[serde(default)]
    checks: Vec<Check>,
}

/// A parsed suite plus file metadata for reports.
#[derive(Debug)]
pub struct LoadedSuite {
    pub suite: Suite,
    pub name: Option<String>,
    /// SHA-256 of the suite file contents, hex-encoded.
    pub fingerprint: String,
    pub path: PathBuf,
}

/// Load and validate a suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the YAML is malformed
/// (with line/column context from `serde_yaml`), a check name repeats, a
/// check has no assertions, or the suite is empty.
pub fn load(path: &Path) -> Result<LoadedSuite> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read suite {}", path.display()))?;
    let fingerprint = format!("{:x}", Sha256::digest(content.as_bytes()));

    let doc: SuiteDoc = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse suite {}", path.display()))?;

    let mut suite = Suite::new();
    for check in doc.checks {
        suite
            .register(check)
            .with_context(|| format!("invalid suite {}", path.display()))?;
    }
    if suite.is_empty() {
        anyhow::bail!("suite {} contains no checks", path.display());
    }

    let name = doc.name.or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    });

    Ok(LoadedSuite {
        suite,
        name,
        fingerprint,
        path: path.to_path_buf(),
    })
}

// ── Unit tests ────────────────────────────────────────────────────────────────
