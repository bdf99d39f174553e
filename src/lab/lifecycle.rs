//! Start / stop / decommission sequences over existing lab containers.

use anyhow::Result;
use colored::Colorize;

use crate::config::{LabConfig, NodeRole};
use crate::infra::ui;
use crate::runtime::{ContainerRuntime, ContainerState};

/// Outcome of a per-node start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Container absent; no start call issued.
    NotCreated,
    AlreadyRunning,
    Started,
    Failed,
}

/// Decide and apply the start action for one container. The state is
/// inspected first so a genuine start failure is never mislabeled as
/// "already running".
pub fn start_node(rt: &ContainerRuntime, cname: &str) -> Result<StartOutcome> {
    if !rt.container_exists(cname)? {
        return Ok(StartOutcome::NotCreated);
    }
    if rt.container_state(cname)? == ContainerState::Running {
        return Ok(StartOutcome::AlreadyRunning);
    }
    match rt.start_container(cname) {
        Ok(()) => Ok(StartOutcome::Started),
        Err(err) => {
            tracing::warn!("start failed for {}: {}", cname, err);
            Ok(StartOutcome::Failed)
        }
    }
}

/// `start`: bring up existing containers, control node first.
pub fn start(config: &LabConfig) -> Result<()> {
    let rt = ContainerRuntime::new(&config.runtime);
    ui::section("Starting lab containers");
    ui::table_header(&["STATUS"]);

    let mut missing = false;
    for node in config.all_nodes() {
        let cname = config.container_name(node);
        let outcome = start_node(&rt, &cname)?;
        let label = match outcome {
            StartOutcome::NotCreated => {
                missing = true;
                "NOT CREATED".red().to_string()
            }
            StartOutcome::AlreadyRunning => "ALREADY RUNNING".yellow().to_string(),
            StartOutcome::Started => "STARTED".green().to_string(),
            StartOutcome::Failed => "FAILED".red().to_string(),
        };
        println!(
            "{} {:<w$} {}",
            ui::role_label(node.role == NodeRole::Control),
            node.name,
            label,
            w = ui::NODE_W,
        );
    }

    if missing {
        println!();
        ui::error("Missing containers — run 'anslab setup'");
    } else {
        println!();
        ui::success("Lab started");
    }
    Ok(())
}

/// `stop`: best-effort stop of every container; failures suppressed so
/// the whole sequence always completes.
pub fn stop(config: &LabConfig) -> Result<()> {
    let rt = ContainerRuntime::new(&config.runtime);
    ui::section("Stopping lab containers");
    ui::table_header(&["STATUS"]);

    for node in config.all_nodes() {
        rt.stop_container(&config.container_name(node));
        println!(
            "{} {:<w$} {}",
            ui::role_label(node.role == NodeRole::Control),
            node.name,
            "STOPPED".yellow(),
            w = ui::NODE_W,
        );
    }

    println!();
    ui::warn("Containers stopped (data preserved)");
    Ok(())
}

/// `decom`: stop all → remove all → remove network, each step
/// best-effort. Images and the workspace directory are preserved.
pub fn decom(config: &LabConfig) -> Result<()> {
    let rt = ContainerRuntime::new(&config.runtime);
    ui::section("Decommissioning lab");

    ui::info("Stopping containers...");
    for node in config.all_nodes() {
        rt.stop_container(&config.container_name(node));
    }

    ui::info("Removing containers...");
    for node in config.all_nodes() {
        rt.remove_container(&config.container_name(node));
    }

    ui::info(&format!("Removing network: {}", config.network.name));
    rt.remove_network(&config.network.name);

    println!();
    ui::warn("Lab decommissioned (images & workspace preserved)");
    Ok(())
}
