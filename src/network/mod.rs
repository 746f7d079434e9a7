//! Network configuration module
//!
//! Translates legacy interface descriptions into systemd-networkd units.
//!
//! The translation runs in three steps:
//! - [`debian`] parses `/etc/network/interfaces` text into an [`InterfaceNode`] forest
//! - [`render`] turns each node into `.netdev`, `.link` and `.network` fragments
//! - [`restart`] takes the affected links down and restarts systemd-networkd

pub mod debian;
pub mod render;
pub mod restart;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// A static route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Destination network
    pub destination: IpNet,
    /// Next hop
    pub gateway: IpAddr,
}

impl Route {
    /// Default route (`0.0.0.0/0` or `::/0`) via `gateway`
    pub fn default_via(gateway: IpAddr) -> Self {
        let destination = match gateway {
            IpAddr::V4(_) => IpNet::V4(Ipv4Net::default()),
            IpAddr::V6(_) => IpNet::V6(Ipv6Net::default()),
        };
        Self {
            destination,
            gateway,
        }
    }
}

/// How an interface gets its addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigMethod {
    /// Statically configured address, nameservers and routes
    Static {
        address: Option<IpNet>,
        nameservers: Vec<IpAddr>,
        routes: Vec<Route>,
    },
    /// Loopback device
    Loopback,
    /// Link is brought up without any addressing
    Manual,
}

impl ConfigMethod {
    /// Method keyword as written in an `iface` line
    pub fn keyword(&self) -> &'static str {
        match self {
            ConfigMethod::Static { .. } => "static",
            ConfigMethod::Loopback => "loopback",
            ConfigMethod::Manual => "manual",
        }
    }
}

/// Kind of a logical interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceKind {
    /// Physical link
    Physical,
    /// Bond aggregating the named slaves
    Bond { slaves: Vec<String> },
    /// VLAN tagged on top of a raw device
    Vlan {
        id: u16,
        raw_device: Option<String>,
    },
}

impl InterfaceKind {
    pub fn is_bond(&self) -> bool {
        matches!(self, InterfaceKind::Bond { .. })
    }

    pub fn is_vlan(&self) -> bool {
        matches!(self, InterfaceKind::Vlan { .. })
    }
}

/// Kind of a dependent interface attached to a parent node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependentKind {
    Bond,
    Vlan,
}

/// Reference from a parent node to a bond or VLAN that sits on top of it
///
/// Dependents order by name first, which is the order their
/// `Bond=`/`VLAN=` lines are rendered in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependent {
    pub name: String,
    pub kind: DependentKind,
}

impl Dependent {
    pub fn bond(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependentKind::Bond,
        }
    }

    pub fn vlan(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependentKind::Vlan,
        }
    }
}

/// One logical interface of the translated topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNode {
    /// Interface name
    pub name: String,
    /// Physical, bond or VLAN
    pub kind: InterfaceKind,
    /// Addressing method
    pub method: ConfigMethod,
    /// Listed in an `auto` stanza
    pub auto: bool,
    /// Bonds and VLANs that attach to this interface
    pub dependents: BTreeSet<Dependent>,
}

impl InterfaceNode {
    /// Create a node with no dependents
    pub fn new(name: impl Into<String>, kind: InterfaceKind, method: ConfigMethod) -> Self {
        Self {
            name: name.into(),
            kind,
            method,
            auto: false,
            dependents: BTreeSet::new(),
        }
    }

    /// Builder-style helper to attach dependents
    pub fn with_dependents(mut self, dependents: impl IntoIterator<Item = Dependent>) -> Self {
        self.dependents.extend(dependents);
        self
    }
}
