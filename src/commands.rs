use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

use crate::config::{self, LabConfig};
use crate::imgbuild;
use crate::infra::{logging, ui};
use crate::lab::{lifecycle, setup, status};

#[derive(Parser)]
#[command(
    name = "anslab",
    version,
    about = "Containerized Ansible teaching lab manager"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the control and managed node images
    Build,
    /// First-time bootstrap: network, containers, SSH trust, inventory, prompts
    Setup,
    /// Start existing lab containers (no creation)
    Start,
    /// Stop running lab containers
    Stop,
    /// Stop and remove containers and the lab network
    Decom,
    /// Show live lab state
    Status,
    /// Dump the parsed configuration
    Info,
}

// ============================================================================
// Command dispatch
// ============================================================================

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = LabConfig::load(Path::new(config::CONFIG_FILE))?;

    match cli.command {
        Commands::Build => cmd_build(),
        Commands::Setup => setup::run(&config),
        Commands::Start => lifecycle::start(&config),
        Commands::Stop => lifecycle::stop(&config),
        Commands::Decom => lifecycle::decom(&config),
        Commands::Status => status::run(&config),
        Commands::Info => cmd_info(&config),
    }
}

/// `build` delegates to the image builder, which runs off its own
/// compile-time parameters (shared with `anslab-imgbuild`).
fn cmd_build() -> Result<()> {
    imgbuild::build_all(&imgbuild::BuildParams::default())
}

fn cmd_info(config: &LabConfig) -> Result<()> {
    let dump = serde_yaml::to_string(config)?;
    ui::info("Lab configuration:\n");
    for line in dump.lines() {
        println!("  {}", line);
    }
    Ok(())
}
