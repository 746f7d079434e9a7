//! Mock datasource for testing
//!
//! Provides a configurable in-memory datasource.

use async_trait::async_trait;

use super::Datasource;
use crate::NetconfError;

/// Mock datasource for testing
///
/// # Example
/// ```
/// use cloudinit_netconf::datasources::MockDatasource;
///
/// let mock = MockDatasource::new()
///     .with_available(true)
///     .with_network_config("iface eth0 inet manual");
/// ```
pub struct MockDatasource {
    name: &'static str,
    available: bool,
    network_config: Option<String>,
    error: Option<String>,
}

impl MockDatasource {
    /// Create a new mock datasource with no network config
    pub fn new() -> Self {
        Self {
            name: "Mock",
            available: true,
            network_config: None,
            error: None,
        }
    }

    /// Set the datasource name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Set whether the datasource is available
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set the network config text to return
    pub fn with_network_config(mut self, config: &str) -> Self {
        self.network_config = Some(config.to_string());
        self
    }

    /// Configure to return an error when fetching
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

impl Default for MockDatasource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datasource for MockDatasource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch_network_config(&self) -> Result<Option<String>, NetconfError> {
        if let Some(error) = &self.error {
            return Err(NetconfError::Datasource(error.clone()));
        }

        Ok(self.network_config.clone())
    }
}
