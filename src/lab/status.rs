//! Live lab status: pure read path over the runtime, rendered as a
//! control-node section followed by a managed-nodes section.

use anyhow::Result;
use colored::Colorize;

use crate::config::{LabConfig, NodeDescriptor};
use crate::infra::ui;
use crate::runtime::{ContainerRuntime, ContainerState};

/// One rendered status row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub node: String,
    pub state: ContainerState,
    /// Operator hint for a running control node with a published port.
    pub access: Option<String>,
}

fn node_row(rt: &ContainerRuntime, config: &LabConfig, node: &NodeDescriptor) -> Result<StatusRow> {
    let state = rt.container_state(&config.container_name(node))?;
    let access = match (&node.ports, state) {
        (Some(ports), ContainerState::Running) => ports
            .first()
            .map(|p| format!("SSH localhost:{}", p.host)),
        _ => None,
    };
    Ok(StatusRow {
        node: node.name.clone(),
        state,
        access,
    })
}

/// Query every node's live state, control first, managed in configured
/// order. Never mutates runtime state.
pub fn collect_rows(
    rt: &ContainerRuntime,
    config: &LabConfig,
) -> Result<(StatusRow, Vec<StatusRow>)> {
    let control = node_row(rt, config, &config.control_node)?;
    let managed = config
        .managed_nodes
        .iter()
        .map(|node| node_row(rt, config, node))
        .collect::<Result<Vec<_>>>()?;
    Ok((control, managed))
}

fn state_label(state: ContainerState) -> String {
    match state {
        ContainerState::Running => "RUNNING".green().to_string(),
        ContainerState::Exited => "STOPPED".yellow().to_string(),
        ContainerState::Unavailable => "UNAVAILABLE".red().to_string(),
    }
}

/// `status`: render the two-section lab table.
pub fn run(config: &LabConfig) -> Result<()> {
    let rt = ContainerRuntime::new(&config.runtime);
    let (control, managed) = collect_rows(&rt, config)?;

    println!("\n{}", "Lab Status".cyan().bold());
    println!(
        "{} {}   {} {}",
        "Runtime:".cyan(),
        config.runtime,
        "Network:".cyan(),
        config.network.name,
    );

    ui::section("CONTROL NODE");
    ui::table_header(&["STATUS       ACCESS"]);
    println!(
        "{} {:<node$} {:<stat$} {}",
        ui::role_label(true),
        control.node,
        state_label(control.state),
        control.access.as_deref().unwrap_or("-"),
        node = ui::NODE_W,
        stat = 12,
    );

    ui::section("MANAGED NODES");
    ui::table_header(&["STATUS"]);
    for row in &managed {
        println!(
            "{} {:<node$} {}",
            ui::role_label(false),
            row.node,
            state_label(row.state),
            node = ui::NODE_W,
        );
    }
    println!();
    Ok(())
}
