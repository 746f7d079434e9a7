//! Error types for cloudinit-netconf

use thiserror::Error;

/// Main error type for cloudinit-netconf operations
#[derive(Error, Debug)]
pub enum NetconfError {
    #[error("missing stanza start '{0}'")]
    MissingStanzaStart(String),

    #[error("malformed stanza start '{0}'")]
    MalformedStanzaStart(String),

    #[error("unknown stanza '{0}'")]
    UnknownStanza(String),

    #[error("invalid config method '{method}' for interface '{interface}'")]
    InvalidConfigMethod { interface: String, method: String },

    #[error("malformed static network config for '{0}'")]
    MalformedStaticNetwork(String),

    #[error("malformed vlan name '{0}'")]
    MalformedVlanName(String),

    #[error("invalid interface name '{0}'")]
    InvalidInterfaceName(String),

    #[error("unsupported network config format '{0}' (supported: 'debian')")]
    UnsupportedConversionFormat(String),

    #[error("Datasource error: {0}")]
    Datasource(String),

    #[error("Command execution failed: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetconfError {
    /// Create an invalid config method error
    pub fn invalid_method(interface: impl Into<String>, method: impl Into<String>) -> Self {
        Self::InvalidConfigMethod {
            interface: interface.into(),
            method: method.into(),
        }
    }

    /// Whether this error came from translating the interfaces document itself
    /// rather than from reading or writing around it.
    pub fn is_translation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingStanzaStart(_)
                | Self::MalformedStanzaStart(_)
                | Self::UnknownStanza(_)
                | Self::InvalidConfigMethod { .. }
                | Self::MalformedStaticNetwork(_)
                | Self::MalformedVlanName(_)
                | Self::InvalidInterfaceName(_)
        )
    }
}
