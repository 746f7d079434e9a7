//! systemd-networkd renderer
//!
//! Generates the .netdev, .link and .network fragments of an interface node.

use super::UnitFragments;
use crate::network::{ConfigMethod, DependentKind, InterfaceKind, InterfaceNode};
use std::fmt::Write;

/// systemd-networkd renderer
pub struct NetworkdRenderer;

impl NetworkdRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the three unit fragments of `node`
    pub fn render(&self, node: &InterfaceNode) -> UnitFragments {
        match &node.kind {
            InterfaceKind::Physical => UnitFragments {
                netdev: String::new(),
                link: String::new(),
                network: self.render_physical_network(node),
            },
            InterfaceKind::Bond { .. } => UnitFragments {
                netdev: self.render_bond_netdev(node),
                link: String::new(),
                network: self.render_bond_network(node),
            },
            InterfaceKind::Vlan { id, .. } => UnitFragments {
                netdev: self.render_vlan_netdev(node, *id),
                link: String::new(),
                network: self.render_vlan_network(node),
            },
        }
    }

    fn render_physical_network(&self, node: &InterfaceNode) -> String {
        let mut content = self.render_network_header(&node.name);
        self.render_dependents(&mut content, node);
        content
    }

    fn render_bond_netdev(&self, node: &InterfaceNode) -> String {
        let mut netdev = String::new();
        writeln!(netdev, "[NetDev]").unwrap();
        writeln!(netdev, "Kind=bond").unwrap();
        writeln!(netdev, "Name={}", node.name).unwrap();
        netdev
    }

    fn render_bond_network(&self, node: &InterfaceNode) -> String {
        let mut content = self.render_network_header(&node.name);
        writeln!(content, "DHCP=true").unwrap();
        self.render_dependents(&mut content, node);
        content
    }

    fn render_vlan_netdev(&self, node: &InterfaceNode, id: u16) -> String {
        let mut netdev = String::new();
        writeln!(netdev, "[NetDev]").unwrap();
        writeln!(netdev, "Kind=vlan").unwrap();
        writeln!(netdev, "Name={}", node.name).unwrap();
        writeln!(netdev).unwrap();
        writeln!(netdev, "[VLAN]").unwrap();
        writeln!(netdev, "Id={}", id).unwrap();
        netdev
    }

    fn render_vlan_network(&self, node: &InterfaceNode) -> String {
        let mut content = self.render_network_header(&node.name);

        // Only static addressing carries a body
        let ConfigMethod::Static {
            address,
            nameservers,
            routes,
        } = &node.method
        else {
            return content;
        };

        for dns in nameservers {
            writeln!(content, "DNS={}", dns).unwrap();
        }

        if let Some(address) = address {
            writeln!(content).unwrap();
            writeln!(content, "[Address]").unwrap();
            writeln!(content, "Address={}", address).unwrap();
        }

        for route in routes {
            writeln!(content).unwrap();
            writeln!(content, "[Route]").unwrap();
            writeln!(content, "Destination={}", route.destination).unwrap();
            writeln!(content, "Gateway={}", route.gateway).unwrap();
        }

        content
    }

    /// `[Match]` section for `name` followed by an open `[Network]` section
    fn render_network_header(&self, name: &str) -> String {
        let mut content = String::new();
        writeln!(content, "[Match]").unwrap();
        writeln!(content, "Name={}", name).unwrap();
        writeln!(content).unwrap();
        writeln!(content, "[Network]").unwrap();
        content
    }

    fn render_dependents(&self, content: &mut String, node: &InterfaceNode) {
        for dependent in &node.dependents {
            match dependent.kind {
                DependentKind::Vlan => writeln!(content, "VLAN={}", dependent.name).unwrap(),
                DependentKind::Bond => writeln!(content, "Bond={}", dependent.name).unwrap(),
            }
        }
    }
}

impl Default for NetworkdRenderer {
    fn default() -> Self {
        Self::new()
    }
}
