//! End-to-end tests for the Debian interfaces translator

use cloudinit_netconf::network::debian::process_debian_netconf;
use cloudinit_netconf::network::render::{RenderedFile, render_units};
use cloudinit_netconf::network::{ConfigMethod, InterfaceKind, InterfaceNode};
use cloudinit_netconf::{ConversionFormat, NetconfError};
use pretty_assertions::assert_eq;

fn translate(config: &str) -> Vec<InterfaceNode> {
    ConversionFormat::Debian.translate(config).unwrap()
}

fn unit<'a>(files: &'a [RenderedFile], file_name: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.file_name() == file_name)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("no unit named {}", file_name))
}

fn file_names(files: &[RenderedFile]) -> Vec<String> {
    files.iter().map(RenderedFile::file_name).collect()
}

/// A single manual interface renders to a bare network unit
#[test]
fn test_single_manual_interface() {
    let nodes = translate("iface eth1 inet manual");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "eth1");
    assert_eq!(nodes[0].kind, InterfaceKind::Physical);

    let files = render_units(&nodes);
    assert_eq!(file_names(&files), vec!["eth1.network"]);
    assert_eq!(files[0].content, "[Match]\nName=eth1\n\n[Network]\n");
}

/// Static VLAN with gateway, nameservers and an extra route
#[test]
fn test_static_vlan() {
    let config = r#"
auto eth0
iface eth0 inet manual

# tagged management network
iface eth0.10 inet static
    vlan_raw_device eth0
    address 10.0.10.5
    netmask 255.255.255.0
    gateway 10.0.10.1
    dns-nameservers 8.8.8.8 8.8.4.4
    post-up route add -net 192.168.0.0 netmask 255.255.0.0 gw 10.0.10.254
"#;
    let files = render_units(&translate(config));

    assert_eq!(
        file_names(&files),
        vec!["eth0.network", "eth0.10.netdev", "eth0.10.network"]
    );
    assert_eq!(
        unit(&files, "eth0.network"),
        "[Match]\nName=eth0\n\n[Network]\nVLAN=eth0.10\n"
    );
    assert_eq!(
        unit(&files, "eth0.10.netdev"),
        "[NetDev]\nKind=vlan\nName=eth0.10\n\n[VLAN]\nId=10\n"
    );
    assert_eq!(
        unit(&files, "eth0.10.network"),
        "[Match]\nName=eth0.10\n\n[Network]\n\
         DNS=8.8.8.8\nDNS=8.8.4.4\n\n\
         [Address]\nAddress=10.0.10.5/24\n\n\
         [Route]\nDestination=0.0.0.0/0\nGateway=10.0.10.1\n\n\
         [Route]\nDestination=192.168.0.0/16\nGateway=10.0.10.254\n"
    );
}

/// Continuation lines are joined before stanzas are parsed
#[test]
fn test_continued_option_line() {
    let config = "iface vlan20 inet static\n    vlan_raw_device eth0\n    address 10.0.20.2\n    netmask \\\n24\n";
    let files = render_units(&translate(config));

    assert_eq!(
        unit(&files, "vlan20.network"),
        "[Match]\nName=vlan20\n\n[Network]\n\n[Address]\nAddress=10.0.20.2/24\n"
    );
    assert!(unit(&files, "vlan20.netdev").contains("Id=20"));
}

#[test]
fn test_bond_slaves_reference_bond() {
    let config = r#"
iface eth1 inet manual
iface eth2 inet manual
iface bond0 inet manual
    bond-slaves eth1 eth2
    bond-mode 802.3ad
"#;
    let files = render_units(&translate(config));

    assert_eq!(
        file_names(&files),
        vec![
            "eth1.network",
            "eth2.network",
            "bond0.netdev",
            "bond0.network"
        ]
    );
    assert_eq!(
        unit(&files, "eth1.network"),
        "[Match]\nName=eth1\n\n[Network]\nBond=bond0\n"
    );
    assert!(unit(&files, "eth2.network").contains("Bond=bond0\n"));
    assert_eq!(
        unit(&files, "bond0.netdev"),
        "[NetDev]\nKind=bond\nName=bond0\n"
    );
    assert_eq!(
        unit(&files, "bond0.network"),
        "[Match]\nName=bond0\n\n[Network]\nDHCP=true\n"
    );
}

/// VLAN on top of a bond on top of a bond
#[test]
fn test_stacked_bonds_and_vlan() {
    let config = r#"
iface eth0 inet manual
iface bond0 inet manual
    bond-slaves eth0
iface bond1 inet manual
    bond-slaves bond0
iface bond1.100 inet manual
    vlan_raw_device bond1
"#;
    let files = render_units(&translate(config));

    assert!(unit(&files, "eth0.network").ends_with("Bond=bond0\n"));
    assert!(unit(&files, "bond0.network").ends_with("DHCP=true\nBond=bond1\n"));
    assert!(unit(&files, "bond1.network").ends_with("DHCP=true\nVLAN=bond1.100\n"));
    assert_eq!(
        unit(&files, "bond1.100.network"),
        "[Match]\nName=bond1.100\n\n[Network]\n"
    );
}

#[test]
fn test_dependents_render_in_name_order() {
    let config = r#"
iface eth0.20 inet manual
    vlan_raw_device eth0
iface eth0 inet manual
iface eth0.10 inet manual
    vlan_raw_device eth0
iface bond0 inet manual
    bond-slaves eth0
"#;
    let files = render_units(&translate(config));

    assert_eq!(
        unit(&files, "eth0.network"),
        "[Match]\nName=eth0\n\n[Network]\nBond=bond0\nVLAN=eth0.10\nVLAN=eth0.20\n"
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let config = r#"
auto lo eth0 eth1
iface lo inet loopback
iface eth0 inet manual
iface eth1 inet manual
iface bond0 inet manual
    bond-slaves eth1 eth0
iface vlan5 inet manual
    vlan_raw_device bond0
iface vlan6 inet manual
    vlan_raw_device bond0
"#;
    let first = render_units(&translate(config));
    for _ in 0..10 {
        assert_eq!(render_units(&translate(config)), first);
    }
}

#[test]
fn test_loopback_is_never_rendered() {
    let config = "auto lo\niface lo inet loopback\n\niface eth0 inet manual\n";
    let nodes = translate(config);

    assert!(nodes.iter().all(|n| n.name != "lo"));
    let files = render_units(&nodes);
    assert!(files.iter().all(|f| f.name != "lo"));
}

#[test]
fn test_auto_flag() {
    let config = "iface eth0 inet manual\niface eth1 inet manual\nauto eth1\n";
    let nodes = translate(config);

    assert!(!nodes[0].auto);
    assert!(nodes[1].auto);
}

#[test]
fn test_vlan_names() {
    let nodes = translate("iface eth0.7 inet manual\niface vlan7 inet manual\n    vlan_raw_device eth0\n");

    for node in &nodes {
        assert!(
            matches!(node.kind, InterfaceKind::Vlan { id: 7, .. }),
            "{} should be VLAN 7",
            node.name
        );
    }

    let err = process_debian_netconf("iface myvlan inet manual\n    vlan_raw_device eth0\n")
        .unwrap_err();
    assert!(matches!(err, NetconfError::MalformedVlanName(name) if name == "myvlan"));
}

#[test]
fn test_multiple_gateways_add_no_route() {
    let config = r#"
iface eth0.3 inet static
    address 10.3.0.2
    netmask 16
    gateway 10.3.0.1 10.3.0.254
"#;
    let nodes = translate(config);

    let ConfigMethod::Static { routes, .. } = &nodes[0].method else {
        panic!("expected static method");
    };
    assert!(routes.is_empty());
    assert!(!render_units(&nodes)[1].content.contains("[Route]"));
}

#[test]
fn test_ipv6_static_vlan() {
    let config = r#"
iface eth0.6 inet6 static
    address 2001:db8::10
    netmask 64
    gateway 2001:db8::1
"#;
    let files = render_units(&translate(config));

    assert_eq!(
        unit(&files, "eth0.6.network"),
        "[Match]\nName=eth0.6\n\n[Network]\n\n\
         [Address]\nAddress=2001:db8::10/64\n\n\
         [Route]\nDestination=::/0\nGateway=2001:db8::1\n"
    );
}

#[test]
fn test_static_without_netmask_fails() {
    let config = "iface eth0 inet static\n    address 10.0.0.2\n    gateway 10.0.0.1\n";
    let err = process_debian_netconf(config).unwrap_err();
    assert!(matches!(err, NetconfError::MalformedStaticNetwork(name) if name == "eth0"));

    let config = "iface eth0 inet static\n    netmask 255.0.0.0\n";
    let err = process_debian_netconf(config).unwrap_err();
    assert!(matches!(err, NetconfError::MalformedStaticNetwork(_)));
}

#[test]
fn test_document_errors() {
    let cases: &[(&str, fn(&NetconfError) -> bool)] = &[
        ("address 10.0.0.1\niface eth0 inet manual\n", |e| {
            matches!(e, NetconfError::MissingStanzaStart(_))
        }),
        ("iface eth0 inet\n", |e| {
            matches!(e, NetconfError::MalformedStanzaStart(_))
        }),
        ("auto\n", |e| matches!(e, NetconfError::MalformedStanzaStart(_))),
        ("mapping eth0\n    script /bin/true\n", |e| {
            matches!(e, NetconfError::UnknownStanza(_))
        }),
        ("iface eth0 inet dhcp\n", |e| {
            matches!(e, NetconfError::InvalidConfigMethod { .. })
        }),
        ("iface /tmp/units/eth0 inet manual\n", |e| {
            matches!(e, NetconfError::InvalidInterfaceName(_))
        }),
        ("iface eth0 inet manual\niface ../../etc/eth0 inet manual\n", |e| {
            matches!(e, NetconfError::InvalidInterfaceName(_))
        }),
    ];

    for (config, expected) in cases {
        let err = process_debian_netconf(config).unwrap_err();
        assert!(expected(&err), "unexpected error {:?} for {:?}", err, config);
        assert!(err.is_translation_error());
    }
}

#[test]
fn test_empty_document() {
    assert!(translate("").is_empty());
    assert!(translate("# nothing here\n\n   \n").is_empty());
}
