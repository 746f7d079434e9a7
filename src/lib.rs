//! cloudinit-netconf library
//!
//! Translates a Debian `/etc/network/interfaces` document delivered by a
//! cloud datasource into systemd-networkd units, writes them and restarts
//! networking.
//!
//! # Design Principles
//!
//! - **Safety First**: No unsafe code (`unsafe_code = "forbid"`)
//! - **All or nothing**: A document that fails to translate produces no units
//! - **Deterministic**: The same input always renders the same files in the same order

pub mod config;
pub mod datasources;
pub mod network;

mod error;

pub use error::NetconfError;

use config::Settings;
use datasources::Datasource;
use network::InterfaceNode;
use network::render::{RenderedFile, render_units, write_units};
use network::restart::NetworkRestarter;
use std::str::FromStr;
use tracing::info;

/// Source dialects the translator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionFormat {
    /// Debian ifupdown `/etc/network/interfaces`
    Debian,
}

impl ConversionFormat {
    /// Translate a document of this format into its interface forest
    pub fn translate(&self, config: &str) -> Result<Vec<InterfaceNode>, NetconfError> {
        match self {
            ConversionFormat::Debian => network::debian::process_debian_netconf(config),
        }
    }
}

impl FromStr for ConversionFormat {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debian" => Ok(ConversionFormat::Debian),
            other => Err(NetconfError::UnsupportedConversionFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ConversionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionFormat::Debian => write!(f, "debian"),
        }
    }
}

/// Result of translating one network config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Translated interfaces, physical then bonds then VLANs
    pub nodes: Vec<InterfaceNode>,
    /// Non-empty unit files, in write order
    pub files: Vec<RenderedFile>,
}

/// Fetch the network config from `source`, translate and render it
///
/// Returns `Ok(None)` when the datasource offers no network config.
pub async fn convert_netconf(
    format: ConversionFormat,
    source: &dyn Datasource,
) -> Result<Option<Conversion>, NetconfError> {
    let Some(config) = source.fetch_network_config().await? else {
        info!("Datasource {} has no network config", source.name());
        return Ok(None);
    };

    info!(
        "Converting {} network config from {}",
        format,
        source.name()
    );
    let nodes = format.translate(&config)?;
    let files = render_units(&nodes);

    Ok(Some(Conversion { nodes, files }))
}

/// Write the rendered units and, if enabled, restart networking
pub async fn apply_netconf(
    conversion: &Conversion,
    settings: &Settings,
    restarter: &dyn NetworkRestarter,
) -> Result<(), NetconfError> {
    write_units(&settings.unit_dir, &conversion.files).await?;

    if settings.restart_network {
        restarter.restart(&conversion.nodes).await?;
    } else {
        info!("Network restart disabled, units will apply on next networkd start");
    }

    Ok(())
}

/// Convert the datasource's network config and apply it
pub async fn process_netconf(
    format: ConversionFormat,
    source: &dyn Datasource,
    settings: &Settings,
    restarter: &dyn NetworkRestarter,
) -> Result<Option<Conversion>, NetconfError> {
    let Some(conversion) = convert_netconf(format, source).await? else {
        return Ok(None);
    };

    apply_netconf(&conversion, settings, restarter).await?;
    Ok(Some(conversion))
}
