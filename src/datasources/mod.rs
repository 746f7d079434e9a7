//! Datasources providing the network configuration to convert
//!
//! The translator itself never fetches anything; a datasource hands it the
//! raw text of the network configuration.

pub mod configdrive;
pub mod mock;

pub use configdrive::ConfigDrive;
pub use mock::MockDatasource;

use crate::NetconfError;
use async_trait::async_trait;

/// Trait for network configuration datasources
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Name of this datasource (e.g., "ConfigDrive")
    fn name(&self) -> &'static str;

    /// Check if this datasource is available
    async fn is_available(&self) -> bool;

    /// Fetch the raw network configuration
    ///
    /// `Ok(None)` means the datasource has no network configuration to offer.
    async fn fetch_network_config(&self) -> Result<Option<String>, NetconfError>;
}
