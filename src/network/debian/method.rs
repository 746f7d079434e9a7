//! Configuration method interpretation
//!
//! Turns the method keyword of an `iface` line plus its options into a
//! [`ConfigMethod`]. Address and netmask of a `static` interface are
//! mandatory; gateways, nameservers and `post-up` routes that do not parse
//! are dropped.

use super::stanza::InterfaceOptions;
use crate::NetconfError;
use crate::network::{ConfigMethod, Route};
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// Interpret the method keyword of interface `iface`
pub fn parse_config_method(
    iface: &str,
    method: &str,
    options: &InterfaceOptions,
) -> Result<ConfigMethod, NetconfError> {
    match method {
        "static" => parse_static(iface, options),
        "loopback" => Ok(ConfigMethod::Loopback),
        "manual" => Ok(ConfigMethod::Manual),
        other => Err(NetconfError::invalid_method(iface, other)),
    }
}

fn parse_static(iface: &str, options: &InterfaceOptions) -> Result<ConfigMethod, NetconfError> {
    let address = options
        .single("address")
        .and_then(|address| address.parse::<IpAddr>().ok());
    let prefix_len = options.single("netmask").and_then(netmask_prefix_len);

    let address = match (address, prefix_len) {
        (Some(address), Some(prefix_len)) => IpNet::new(address, prefix_len).ok(),
        _ => None,
    }
    .ok_or_else(|| NetconfError::MalformedStaticNetwork(iface.to_string()))?;

    let mut routes = Vec::new();
    match options.get("gateway") {
        Some([gateway]) => match gateway.parse::<IpAddr>() {
            Ok(gateway) => routes.push(Route::default_via(gateway)),
            Err(_) => debug!("Ignoring unparsable gateway '{}' for {}", gateway, iface),
        },
        Some(gateways) if gateways.len() > 1 => {
            debug!("Ignoring {} gateways for {}", gateways.len(), iface);
        }
        _ => {}
    }

    let nameservers = options
        .get("dns-nameservers")
        .unwrap_or_default()
        .iter()
        .filter_map(|nameserver| match nameserver.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                debug!("Ignoring unparsable nameserver '{}' for {}", nameserver, iface);
                None
            }
        })
        .collect();

    for command in options.get("post-up").unwrap_or_default() {
        match parse_route_command(command) {
            Some(route) => routes.push(route),
            None => debug!("Ignoring post-up command for {}: {}", iface, command),
        }
    }

    Ok(ConfigMethod::Static {
        address: Some(address),
        nameservers,
        routes,
    })
}

/// Parse a `route add ... -net <dest> netmask <mask> gw <gateway>` command
///
/// The three keyword/value pairs may come in any order. Anything else,
/// including a command missing one of the pairs, yields `None`.
pub fn parse_route_command(command: &str) -> Option<Route> {
    let fields: Vec<&str> = command.split_whitespace().collect();
    if !matches!(fields.as_slice(), ["route", "add", ..]) {
        return None;
    }

    let mut destination = None;
    let mut netmask = None;
    let mut gateway = None;
    for pair in fields.windows(2) {
        match pair[0] {
            "-net" => destination = Some(pair[1]),
            "netmask" => netmask = Some(pair[1]),
            "gw" => gateway = Some(pair[1]),
            _ => {}
        }
    }

    let destination: IpAddr = destination?.parse().ok()?;
    let prefix_len = netmask_prefix_len(netmask?)?;
    let gateway: IpAddr = gateway?.parse().ok()?;

    Some(Route {
        destination: IpNet::new(destination, prefix_len).ok()?,
        gateway,
    })
}

/// Prefix length of a netmask given as dotted quad or as a bare length
///
/// Dotted masks must be contiguous.
pub fn netmask_prefix_len(netmask: &str) -> Option<u8> {
    if let Ok(mask) = netmask.parse::<Ipv4Addr>() {
        let bits = u32::from(mask);
        let ones = bits.leading_ones();
        // Every bit after the leading ones must be clear
        return (bits.checked_shl(ones).unwrap_or(0) == 0).then_some(ones as u8);
    }

    netmask.strip_prefix('/').unwrap_or(netmask).parse().ok()
}
