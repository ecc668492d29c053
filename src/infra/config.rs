//! Configuration loading from `~/.vigil/config.yaml`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::VigilConfig;

/// Loads `VigilConfig` from a YAML file on disk. A missing file yields the
/// defaults; a malformed file is a configuration error.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<VigilConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(VigilConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Config file location: `VIGIL_CONFIG` override, else
    /// `~/.vigil/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("VIGIL_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".vigil").join("config.yaml"))
    }
}
