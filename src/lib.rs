//! # anslab — containerized Ansible teaching lab provisioner
//!
//! Builds control/managed node images, provisions the lab on a local
//! container runtime (docker or podman), wires SSH trust between nodes,
//! and seeds the inventory and shell UX for an Ansible teaching lab.
//!
//! ## Module breakdown
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | `lab_config.yaml` schema and loading |
//! | [`runtime`] | Container runtime CLI wrapper (network/container/image verbs) |
//! | [`imgbuild`] | Containerfile synthesis and image builds |
//! | [`lab`] | Lab lifecycle: setup, start/stop, decom, status |
//! | [`commands`] | Clap CLI and dispatch |
//! | [`infra`] | Shell execution, UI, logging |

pub mod commands;
pub mod config;
pub mod imgbuild;
pub mod infra;
pub mod lab;
pub mod runtime;
