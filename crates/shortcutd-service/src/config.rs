//! Service configuration from `<config_dir>/shortcutd/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use shortcutd_core::prelude::*;

const CONFIG_DIR: &str = "shortcutd";
const CONFIG_FILENAME: &str = "config.toml";

/// Runtime configuration for the daemon.
///
/// Every key is optional in the file; CLI flags override file values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Port the control channel listens on (127.0.0.1)
    pub bind_port: u16,
    /// Port results are sent back to (127.0.0.1)
    pub reply_port: u16,
    /// Inactivity window before a current job may be preempted
    pub idle_timeout_secs: u64,
    /// Where the desktop-entry backend drops launchers; defaults to the
    /// platform applications directory
    pub pin_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_port: 9301,
            reply_port: 9302,
            idle_timeout_secs: 30,
            pin_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a config file, failing loudly on unreadable or invalid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid config {}: {e}", path.display())))
    }

    /// Load from an explicit path or the default location.
    ///
    /// A missing default file is normal (defaults apply); a malformed file
    /// is logged and ignored rather than taking the daemon down.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let candidate = path
            .map(Path::to_path_buf)
            .or_else(default_config_path);
        let Some(candidate) = candidate else {
            return Self::default();
        };
        match Self::load(&candidate) {
            Ok(config) => {
                info!(path = %candidate.display(), "loaded config");
                config
            }
            Err(Error::ConfigNotFound { .. }) => {
                debug!(path = %candidate.display(), "no config file, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(%err, "ignoring broken config file");
                Self::default()
            }
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Directory the desktop-entry pin backend writes into.
    pub fn pin_directory(&self) -> PathBuf {
        self.pin_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("applications")
        })
    }
}

/// Default config file location, `None` when the platform has no config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
