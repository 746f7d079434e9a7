//! Unit file rendering and writing
//!
//! Every interface node contributes up to three systemd-networkd units:
//! - `<name>.netdev` - creates the virtual device (bonds and VLANs only)
//! - `<name>.link` - link settings (reserved, currently always empty)
//! - `<name>.network` - addressing and attachments

pub mod networkd;

use crate::NetconfError;
use crate::network::InterfaceNode;
use networkd::NetworkdRenderer;
use std::path::{Component, Path};
use tokio::fs;
use tracing::{debug, info};

/// Runtime directory systemd-networkd reads units from
pub const RUNTIME_NETWORK_DIR: &str = "/run/systemd/network";

/// Permissions of written unit files
const UNIT_FILE_MODE: u32 = 0o644;

/// Kind of a systemd-networkd unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Netdev,
    Link,
    Network,
}

impl UnitKind {
    /// File extension of this unit kind
    pub fn extension(&self) -> &'static str {
        match self {
            UnitKind::Netdev => "netdev",
            UnitKind::Link => "link",
            UnitKind::Network => "network",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// The three unit fragments of one interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFragments {
    pub netdev: String,
    pub link: String,
    pub network: String,
}

impl UnitFragments {
    /// Fragments paired with their unit kind, in write order
    pub fn into_units(self) -> [(UnitKind, String); 3] {
        [
            (UnitKind::Netdev, self.netdev),
            (UnitKind::Link, self.link),
            (UnitKind::Network, self.network),
        ]
    }
}

/// A rendered unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Interface the unit belongs to
    pub name: String,
    /// Unit kind
    pub kind: UnitKind,
    /// File contents
    pub content: String,
}

impl RenderedFile {
    /// File name relative to the unit directory
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }
}

/// Render all nodes, skipping empty fragments
///
/// Files come out in node order, and per node as netdev, link, network.
pub fn render_units(nodes: &[InterfaceNode]) -> Vec<RenderedFile> {
    let renderer = NetworkdRenderer::new();

    nodes
        .iter()
        .flat_map(|node| {
            renderer
                .render(node)
                .into_units()
                .into_iter()
                .filter(|(_, content)| !content.is_empty())
                .map(move |(kind, content)| RenderedFile {
                    name: node.name.clone(),
                    kind,
                    content,
                })
        })
        .collect()
}

/// Write rendered units into `unit_dir`
pub async fn write_units(
    unit_dir: impl AsRef<Path>,
    files: &[RenderedFile],
) -> Result<(), NetconfError> {
    let unit_dir = unit_dir.as_ref();
    fs::create_dir_all(unit_dir).await?;

    for file in files {
        let file_name = file.file_name();
        // A single plain component cannot leave unit_dir
        let mut components = Path::new(&file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(NetconfError::InvalidInterfaceName(file.name.clone()));
        }

        let full_path = unit_dir.join(&file_name);
        debug!("Writing network unit: {}", full_path.display());

        fs::write(&full_path, &file.content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(UNIT_FILE_MODE))
                .await?;
        }
    }

    info!(
        "Wrote {} network units to {}",
        files.len(),
        unit_dir.display()
    );
    Ok(())
}
