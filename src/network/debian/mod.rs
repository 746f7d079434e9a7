//! Debian `/etc/network/interfaces` translator
//!
//! Reads the ifupdown dialect and reconstructs the physical, bond and VLAN
//! topology it describes:
//!
//! ```text
//! auto eth0
//! iface eth0 inet manual
//!
//! iface eth0.10 inet static
//!     vlan_raw_device eth0
//!     address 10.0.10.5
//!     netmask 255.255.255.0
//!     gateway 10.0.10.1
//! ```
//!
//! Translation fails on the first malformed stanza; nothing is produced for a
//! document that does not parse completely.

pub mod builder;
pub mod method;
pub mod stanza;

pub use builder::{build_interfaces, classify};
pub use stanza::{
    AutoDeclaration, Declaration, InterfaceDeclaration, InterfaceOptions, parse_stanzas,
};

use crate::NetconfError;
use crate::network::InterfaceNode;
use tracing::{debug, info};

/// Translate an interfaces document into its interface forest
pub fn process_debian_netconf(config: &str) -> Result<Vec<InterfaceNode>, NetconfError> {
    let lines = format_config(config);
    debug!("Read {} logical lines of network config", lines.len());

    let declarations = parse_stanzas(&lines)?;
    let interfaces: Vec<InterfaceDeclaration> = declarations
        .into_iter()
        .filter_map(|declaration| match declaration {
            Declaration::Interface(iface) => Some(iface),
            Declaration::Auto(_) => None,
        })
        .collect();

    let nodes = build_interfaces(interfaces)?;
    info!("Translated {} network interfaces", nodes.len());
    Ok(nodes)
}

/// Split raw text into logical lines
///
/// A backslash at the very end of a line splices the next line onto it.
/// Comment lines (first non-blank character `#`) and blank lines are dropped,
/// the rest are trimmed.
pub fn format_config(config: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for raw in config.lines() {
        if let Some(head) = raw.strip_suffix('\\') {
            current.push_str(head);
            continue;
        }
        current.push_str(raw);
        push_logical_line(&mut lines, &current);
        current.clear();
    }

    // Continuation on the last line has nothing to join
    push_logical_line(&mut lines, &current);

    lines
}

fn push_logical_line(lines: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }
    lines.push(line.to_string());
}
