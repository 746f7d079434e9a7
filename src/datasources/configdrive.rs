//! OpenStack config-drive datasource
//!
//! The network configuration file is named by the instance metadata:
//!
//! ```text
//! <root>/openstack/latest/meta_data.json   {"network_config": {"content_path": "content/0000"}}
//! <root>/openstack/content/0000            /etc/network/interfaces text
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::Datasource;
use crate::NetconfError;

/// Metadata location relative to the `openstack` directory
const METADATA_PATH: &str = "latest/meta_data.json";

#[derive(Debug, Default, Deserialize)]
struct ConfigDriveMetadata {
    #[serde(default)]
    network_config: NetworkConfigRef,
}

#[derive(Debug, Default, Deserialize)]
struct NetworkConfigRef {
    #[serde(default)]
    content_path: String,
}

/// Config-drive mounted at a local directory
#[derive(Debug, Clone)]
pub struct ConfigDrive {
    root: PathBuf,
}

impl ConfigDrive {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn openstack_root(&self) -> PathBuf {
        self.root.join("openstack")
    }

    fn metadata_path(&self) -> PathBuf {
        self.openstack_root().join(METADATA_PATH)
    }

    /// Path of the network configuration named in the metadata, if any
    async fn network_config_path(&self) -> Result<Option<PathBuf>, NetconfError> {
        let meta_path = self.metadata_path();
        debug!("Reading config-drive metadata from {}", meta_path.display());

        let content = fs::read_to_string(&meta_path).await.map_err(|e| {
            NetconfError::Datasource(format!(
                "Failed to read config-drive metadata {}: {}",
                meta_path.display(),
                e
            ))
        })?;
        let metadata: ConfigDriveMetadata = serde_json::from_str(&content)?;

        let content_path = metadata.network_config.content_path;
        let content_path = content_path.trim_start_matches('/');
        if content_path.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.openstack_root().join(content_path)))
    }
}

#[async_trait]
impl Datasource for ConfigDrive {
    fn name(&self) -> &'static str {
        "ConfigDrive"
    }

    async fn is_available(&self) -> bool {
        fs::metadata(self.metadata_path()).await.is_ok()
    }

    async fn fetch_network_config(&self) -> Result<Option<String>, NetconfError> {
        let Some(path) = self.network_config_path().await? else {
            debug!("Config-drive metadata names no network config");
            return Ok(None);
        };

        debug!("Reading network config from {}", path.display());
        let content = fs::read_to_string(&path).await.map_err(|e| {
            NetconfError::Datasource(format!(
                "Failed to read network config {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(content))
    }
}
