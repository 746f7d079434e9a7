//! Network restart after new units are written
//!
//! Links that are about to be reconfigured are taken down, the kernel
//! modules needed for VLANs and bonds are loaded, and systemd-networkd is
//! restarted to pick up the new units.

use crate::NetconfError;
use crate::network::InterfaceNode;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the kernel lists existing links
const SYS_CLASS_NET: &str = "/sys/class/net";

/// Kernel module providing 802.1q VLAN tagging
pub const VLAN_MODULE: &str = "8021q";

/// Kernel module providing link bonding
pub const BONDING_MODULE: &str = "bonding";

/// One step of a network restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartAction {
    /// Take an existing link down
    LinkDown(String),
    /// Load a kernel module
    LoadModule(&'static str),
    /// Restart systemd-networkd
    RestartNetworkd,
}

impl RestartAction {
    /// Program and arguments carrying out this action
    pub fn command(&self) -> (&'static str, Vec<String>) {
        match self {
            RestartAction::LinkDown(name) => (
                "ip",
                vec![
                    "link".to_string(),
                    "set".to_string(),
                    "dev".to_string(),
                    name.clone(),
                    "down".to_string(),
                ],
            ),
            RestartAction::LoadModule(module) => ("modprobe", vec![module.to_string()]),
            RestartAction::RestartNetworkd => (
                "systemctl",
                vec!["restart".to_string(), "systemd-networkd".to_string()],
            ),
        }
    }
}

/// Compute the restart steps for `nodes`
///
/// `link_exists` reports whether a link of the given name is present on the
/// system; only present links are taken down. The networkd restart is always
/// the last step.
pub fn plan_restart(
    nodes: &[InterfaceNode],
    link_exists: impl Fn(&str) -> bool,
) -> Vec<RestartAction> {
    let mut plan: Vec<RestartAction> = nodes
        .iter()
        .filter(|node| link_exists(&node.name))
        .map(|node| RestartAction::LinkDown(node.name.clone()))
        .collect();

    if nodes.iter().any(|node| node.kind.is_vlan()) {
        plan.push(RestartAction::LoadModule(VLAN_MODULE));
    }
    if nodes.iter().any(|node| node.kind.is_bond()) {
        plan.push(RestartAction::LoadModule(BONDING_MODULE));
    }

    plan.push(RestartAction::RestartNetworkd);
    plan
}

/// Applies freshly written units to the running system
#[async_trait]
pub trait NetworkRestarter: Send + Sync {
    /// Restart networking for the translated interfaces
    async fn restart(&self, nodes: &[InterfaceNode]) -> Result<(), NetconfError>;
}

/// Restarter for hosts managed by systemd-networkd
pub struct SystemdNetworkd {
    sys_class_net: PathBuf,
}

impl SystemdNetworkd {
    pub fn new() -> Self {
        Self {
            sys_class_net: PathBuf::from(SYS_CLASS_NET),
        }
    }

    /// Use a different sysfs link directory (for testing)
    pub fn with_sys_class_net(path: impl AsRef<Path>) -> Self {
        Self {
            sys_class_net: path.as_ref().to_path_buf(),
        }
    }

    /// Steps this restarter would run for `nodes`
    pub fn plan(&self, nodes: &[InterfaceNode]) -> Vec<RestartAction> {
        plan_restart(nodes, |name| self.sys_class_net.join(name).exists())
    }

    async fn run(&self, action: &RestartAction) -> Result<(), NetconfError> {
        let (program, args) = action.command();
        debug!("Running {} {}", program, args.join(" "));

        let output = tokio::process::Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|e| NetconfError::Command(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NetconfError::Command(format!(
                "{} {} failed: {}",
                program,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Default for SystemdNetworkd {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkRestarter for SystemdNetworkd {
    async fn restart(&self, nodes: &[InterfaceNode]) -> Result<(), NetconfError> {
        let mut first_error = None;

        for action in self.plan(nodes) {
            // After a failure only the networkd restart is still attempted
            if first_error.is_some() && action != RestartAction::RestartNetworkd {
                continue;
            }
            if let Err(e) = self.run(&action).await {
                warn!("Network restart step {:?} failed: {}", action, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("systemd-networkd restarted");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{ConfigMethod, InterfaceKind};
    use tempfile::TempDir;

    fn nodes() -> Vec<InterfaceNode> {
        vec![
            InterfaceNode::new("eth0", InterfaceKind::Physical, ConfigMethod::Manual),
            InterfaceNode::new(
                "bond0",
                InterfaceKind::Bond {
                    slaves: vec!["eth0".to_string()],
                },
                ConfigMethod::Manual,
            ),
            InterfaceNode::new(
                "eth0.10",
                InterfaceKind::Vlan {
                    id: 10,
                    raw_device: Some("eth0".to_string()),
                },
                ConfigMethod::Manual,
            ),
        ]
    }

    #[test]
    fn test_plan_restart() {
        let plan = plan_restart(&nodes(), |name| name == "eth0");
        assert_eq!(
            plan,
            vec![
                RestartAction::LinkDown("eth0".to_string()),
                RestartAction::LoadModule(VLAN_MODULE),
                RestartAction::LoadModule(BONDING_MODULE),
                RestartAction::RestartNetworkd,
            ]
        );
    }

    #[test]
    fn test_plan_restart_physical_only() {
        let plan = plan_restart(&nodes()[..1], |_| false);
        assert_eq!(plan, vec![RestartAction::RestartNetworkd]);
    }

    #[test]
    fn test_action_commands() {
        let (program, args) = RestartAction::LinkDown("eth1".to_string()).command();
        assert_eq!(program, "ip");
        assert_eq!(args, vec!["link", "set", "dev", "eth1", "down"]);

        let (program, args) = RestartAction::LoadModule(VLAN_MODULE).command();
        assert_eq!(program, "modprobe");
        assert_eq!(args, vec!["8021q"]);

        let (program, args) = RestartAction::RestartNetworkd.command();
        assert_eq!(program, "systemctl");
        assert_eq!(args, vec!["restart", "systemd-networkd"]);
    }

    #[test]
    fn test_systemd_plan_uses_sysfs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("bond0")).unwrap();

        let restarter = SystemdNetworkd::with_sys_class_net(temp.path());
        let plan = restarter.plan(&nodes());
        assert_eq!(plan[0], RestartAction::LinkDown("bond0".to_string()));
        assert_eq!(plan.len(), 4);
    }
}
