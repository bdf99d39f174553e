//! First-time lab bootstrap: a fixed, linear sequence with no rollback.
//! A failing step aborts the remainder; the operator re-runs or
//! remediates by hand.

use anyhow::{Context, Result};

use crate::config::{LabConfig, NodeDescriptor, NodeRole};
use crate::infra::ui;
use crate::lab::{ssh, ux};
use crate::runtime::{ContainerRuntime, RunSpec};

/// Create the lab network only if it does not already exist.
pub fn ensure_network(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    let net = &config.network.name;
    if rt.network_exists(net)? {
        ui::info(&format!("Network '{}' already exists", net));
        return Ok(());
    }
    rt.create_network(net)
}

/// Create and start one lab container. The control node gets its port
/// mappings and, when enabled, the workspace bind mount.
pub fn launch_node(rt: &ContainerRuntime, config: &LabConfig, node: &NodeDescriptor) -> Result<()> {
    let cname = config.container_name(node);
    let is_control = node.role == NodeRole::Control;

    ui::info(&format!(
        "{} {} (image: {})",
        if is_control { "CONTROL" } else { "MANAGED" },
        node.name,
        node.image,
    ));

    let ports = if is_control {
        node.ports.as_deref().unwrap_or(&[])
    } else {
        &[]
    };

    let workspace = config
        .workspace
        .as_ref()
        .filter(|ws| is_control && ws.enabled);
    if let Some(ws) = workspace {
        std::fs::create_dir_all(&ws.local_base_dir)
            .with_context(|| format!("Failed to create workspace dir {}", ws.local_base_dir))?;
    }
    let volume = workspace.map(|ws| (ws.local_base_dir.as_str(), ws.container_path.as_str()));

    rt.run_container(&RunSpec {
        name: &cname,
        hostname: &node.hostname,
        network: &config.network.name,
        ports,
        volume,
        image: &node.image,
    })?;
    ui::success(&format!("{} started", node.name));
    Ok(())
}

/// The full `setup` sequence. Steps 5 and 6 are config-gated no-ops when
/// their sections are absent.
pub fn run(config: &LabConfig) -> Result<()> {
    let rt = ContainerRuntime::new(&config.runtime);
    rt.ensure_available()?;

    ui::step(1, 8, "Ensuring lab network...");
    ensure_network(&rt, config)?;

    ui::step(2, 8, "Launching containers...");
    for node in config.all_nodes() {
        launch_node(&rt, config, node)?;
    }

    ui::step(3, 8, "Installing SSH key on control node...");
    ssh::install_control_key(&rt, config)?;

    ui::step(4, 8, "Distributing trust to managed nodes...");
    ssh::distribute_trust(&rt, config)?;

    ui::step(5, 8, "Injecting host SSH keys...");
    ssh::inject_host_keys(&rt, config)?;

    ui::step(6, 8, "Configuring SSH client on control node...");
    ssh::configure_client(&rt, config)?;

    ui::step(7, 8, "Seeding Ansible inventory...");
    ux::seed_inventory(&rt, config)?;

    ui::step(8, 8, "Configuring shell prompts...");
    ux::configure_prompts(&rt, config)?;

    ui::success("\nLab setup complete. Run 'anslab status' to verify.");
    Ok(())
}
