//! Interface classification and topology building
//!
//! Each `iface` declaration becomes a physical, bond or VLAN node. Bonds and
//! VLANs are then attached as dependents of the interfaces they sit on, looked
//! up by name. References to interfaces the document does not declare are
//! left unlinked.

use super::stanza::InterfaceDeclaration;
use crate::NetconfError;
use crate::network::{Dependent, InterfaceKind, InterfaceNode};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Name of the loopback interface, never managed as a link
const LOOPBACK_NAME: &str = "lo";

/// Decide whether a declaration describes a physical link, a bond or a VLAN
///
/// A `vlan_raw_device` option or a dotted name makes a VLAN, otherwise
/// `bond-slaves` makes a bond.
pub fn classify(iface: &InterfaceDeclaration) -> Result<InterfaceKind, NetconfError> {
    let options = &iface.options;

    if options.contains("vlan_raw_device") || iface.name.contains('.') {
        let id = vlan_id(&iface.name)
            .ok_or_else(|| NetconfError::MalformedVlanName(iface.name.clone()))?;
        let raw_device = options.single("vlan_raw_device").map(str::to_string);
        return Ok(InterfaceKind::Vlan { id, raw_device });
    }

    if let Some(slaves) = options.get("bond-slaves") {
        return Ok(InterfaceKind::Bond {
            slaves: slaves.to_vec(),
        });
    }

    Ok(InterfaceKind::Physical)
}

/// VLAN id encoded in an interface name (`eth0.7` or `vlan7`)
pub fn vlan_id(name: &str) -> Option<u16> {
    let id = match name.rsplit_once('.') {
        Some((_, id)) => id,
        None => name.strip_prefix("vlan")?,
    };
    id.parse().ok()
}

/// Build the interface forest from all `iface` declarations of a document
///
/// Nodes come back physical first, then bonds, then VLANs, each group sorted
/// by name. A later declaration replaces an earlier one of the same name and
/// kind.
pub fn build_interfaces(
    declarations: Vec<InterfaceDeclaration>,
) -> Result<Vec<InterfaceNode>, NetconfError> {
    let mut physicals: BTreeMap<String, InterfaceNode> = BTreeMap::new();
    let mut bonds: BTreeMap<String, InterfaceNode> = BTreeMap::new();
    let mut vlans: BTreeMap<String, InterfaceNode> = BTreeMap::new();

    for iface in declarations {
        let kind = classify(&iface)?;
        for (key, values) in iface.options.iter() {
            trace!("{} option {} = {:?}", iface.name, key, values);
        }

        let pool = match kind {
            InterfaceKind::Physical if iface.name == LOOPBACK_NAME => {
                debug!("Skipping loopback interface {}", iface.name);
                continue;
            }
            InterfaceKind::Physical => &mut physicals,
            InterfaceKind::Bond { .. } => &mut bonds,
            InterfaceKind::Vlan { .. } => &mut vlans,
        };

        let mut node = InterfaceNode::new(iface.name.clone(), kind, iface.method);
        node.auto = iface.auto;
        pool.insert(iface.name, node);
    }

    // Attach VLANs to their raw devices
    for vlan in vlans.values() {
        let InterfaceKind::Vlan {
            raw_device: Some(raw_device),
            ..
        } = &vlan.kind
        else {
            continue;
        };

        let mut linked = false;
        for parent in [physicals.get_mut(raw_device), bonds.get_mut(raw_device)]
            .into_iter()
            .flatten()
        {
            parent.dependents.insert(Dependent::vlan(&vlan.name));
            linked = true;
        }
        if !linked {
            debug!("Raw device {} of {} is not declared", raw_device, vlan.name);
        }
    }

    // Attach bonds to their slaves. Edges are collected first so a bond can
    // be the slave of another bond.
    let edges: Vec<(String, String)> = bonds
        .values()
        .filter_map(|bond| match &bond.kind {
            InterfaceKind::Bond { slaves } => Some(
                slaves
                    .iter()
                    .map(|slave| (slave.clone(), bond.name.clone()))
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        })
        .flatten()
        .collect();

    for (slave, bond) in edges {
        if slave == bond {
            debug!("Bond {} lists itself as a slave, ignoring", bond);
            continue;
        }

        let mut linked = false;
        for parent in [physicals.get_mut(&slave), bonds.get_mut(&slave)]
            .into_iter()
            .flatten()
        {
            parent.dependents.insert(Dependent::bond(&bond));
            linked = true;
        }
        if !linked {
            debug!("Slave {} of {} is not declared", slave, bond);
        }
    }

    Ok(physicals
        .into_values()
        .chain(bonds.into_values())
        .chain(vlans.into_values())
        .collect())
}
