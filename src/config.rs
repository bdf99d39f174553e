use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed relative path of the lab configuration file.
pub const CONFIG_FILE: &str = "lab_config.yaml";

/// Node class within the lab. Attached at config-load time; never
/// serialized, so `info` round-trips stay schema-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    Control,
    #[default]
    Managed,
}

/// One host→container port mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

/// A single lab node (control or managed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub hostname: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortMapping>>,
    #[serde(skip)]
    pub role: NodeRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub ssh_key_dir: String,
    pub ssh_key_name: String,
}

/// Optional host-side workspace bind-mounted into the control node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub enabled: bool,
    pub local_base_dir: String,
    pub container_path: String,
}

/// Optional operator public keys appended to the control node's
/// authorized_keys during setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSshKeys {
    pub enabled: bool,
    #[serde(default)]
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshOptions {
    #[serde(default)]
    pub skip_host_key_check: bool,
}

/// Parsed `lab_config.yaml`. Loaded once per invocation and threaded by
/// reference through every component; immutable for the run's duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    pub runtime: String,
    pub network: NetworkConfig,
    pub naming: NamingConfig,
    pub user: UserConfig,
    pub control_node: NodeDescriptor,
    pub managed_nodes: Vec<NodeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ssh_keys: Option<HostSshKeys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshOptions>,
}

impl LabConfig {
    /// Load and validate the config file; absence is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse from YAML and resolve node roles.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut config: LabConfig = serde_yaml::from_str(raw)?;

        if !matches!(config.runtime.as_str(), "docker" | "podman") {
            bail!("Unsupported runtime: {:?} (expected docker or podman)", config.runtime);
        }

        config.control_node.role = NodeRole::Control;
        for node in &mut config.managed_nodes {
            node.role = NodeRole::Managed;
        }
        Ok(config)
    }

    /// Container name for a node: `{prefix}-{name}`.
    pub fn container_name(&self, node: &NodeDescriptor) -> String {
        format!("{}-{}", self.naming.prefix, node.name)
    }

    /// All nodes in lifecycle order: control first, then managed as configured.
    pub fn all_nodes(&self) -> impl Iterator<Item = &NodeDescriptor> {
        std::iter::once(&self.control_node).chain(self.managed_nodes.iter())
    }

    /// Host-side private/public key paths (tilde-expanded).
    pub fn ssh_key_paths(&self) -> (PathBuf, PathBuf) {
        let dir = expand_tilde(&self.user.ssh_key_dir);
        let private = dir.join(&self.user.ssh_key_name);
        let public = PathBuf::from(format!("{}.pub", private.display()));
        (private, public)
    }
}

/// Expand a leading `~/` against $HOME. Paths without a tilde pass through.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
