//! Runtime settings
//!
//! Settings come from an optional YAML file; command line flags override them.

use crate::NetconfError;
use crate::network::render::RUNTIME_NETWORK_DIR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cloudinit-netconf.yaml";

/// Settings for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory unit files are written to
    pub unit_dir: PathBuf,

    /// Restart networking after writing units
    pub restart_network: bool,

    /// Exit successfully even if processing fails
    pub ignore_failure: bool,

    /// Config-drive root to read the network config from
    pub config_drive: Option<PathBuf>,

    /// Source network config format
    pub convert_netconf: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit_dir: PathBuf::from(RUNTIME_NETWORK_DIR),
            restart_network: true,
            ignore_failure: false,
            config_drive: None,
            convert_netconf: None,
        }
    }
}

impl Settings {
    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load settings from `path`
    ///
    /// A missing file yields the defaults, as does an unparsable one (with a
    /// warning). Only read errors on an existing file are reported.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NetconfError> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;

        match Self::from_yaml(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }
}
