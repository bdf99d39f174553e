//! SSH bootstrap: host-side keypair management and one-directional
//! trust (control → managed) inside the lab.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{LabConfig, expand_tilde};
use crate::infra::{shell, ui};
use crate::runtime::ContainerRuntime;

/// Ensure the host-side RSA keypair exists under the configured key
/// directory, generating it once and reusing it across runs.
pub fn ensure_host_keypair(config: &LabConfig) -> Result<(PathBuf, PathBuf)> {
    let (private, public) = config.ssh_key_paths();
    let key_dir = private.parent().context("SSH key path has no parent")?;
    std::fs::create_dir_all(key_dir)
        .with_context(|| format!("Failed to create key directory {}", key_dir.display()))?;

    if !private.exists() {
        let key_path = private
            .to_str()
            .with_context(|| format!("Non-UTF8 key path: {}", private.display()))?;
        shell::run_host_visible(
            "ssh-keygen",
            &["-t", "rsa", "-b", "4096", "-f", key_path, "-N", ""],
        )
        .context("ssh-keygen failed")?;
    }
    Ok((private, public))
}

fn home(config: &LabConfig) -> String {
    format!("/home/{}", config.user.name)
}

/// Install the lab keypair into the control node's `~/.ssh`.
pub fn install_control_key(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    let (private, public) = ensure_host_keypair(config)?;
    let cname = config.container_name(&config.control_node);
    let user = &config.user.name;
    let home = home(config);

    rt.exec_script(&cname, &format!("mkdir -p {home}/.ssh"))?;
    rt.copy_in(&private, &cname, &format!("{home}/.ssh/id_rsa"))?;
    rt.copy_in(&public, &cname, &format!("{home}/.ssh/id_rsa.pub"))?;
    rt.exec_script(
        &cname,
        &format!(
            "chown -R {user}:{user} {home}/.ssh && chmod 700 {home}/.ssh && chmod 600 {home}/.ssh/id_rsa"
        ),
    )
}

/// Append the control node's public key to every managed node's
/// authorized_keys. Trust is one-directional: control → managed.
pub fn distribute_trust(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    let (_, public) = ensure_host_keypair(config)?;
    let pub_key = std::fs::read_to_string(&public)
        .with_context(|| format!("Failed to read {}", public.display()))?
        .trim()
        .to_string();

    for node in &config.managed_nodes {
        let cname = config.container_name(node);
        rt.exec_script(&cname, &authorized_key_script(config, &pub_key))?;
    }
    Ok(())
}

/// Append operator-provided host public keys to the control node's
/// authorized_keys. Missing key files warn and are skipped.
pub fn inject_host_keys(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    let Some(host_keys) = config.host_ssh_keys.as_ref().filter(|k| k.enabled) else {
        return Ok(());
    };
    let cname = config.container_name(&config.control_node);

    for key_path in &host_keys.keys {
        let key_file = expand_tilde(key_path);
        if !key_file.exists() {
            ui::warn(&format!("Host SSH key not found: {}", key_file.display()));
            continue;
        }
        let key = std::fs::read_to_string(&key_file)
            .with_context(|| format!("Failed to read {}", key_file.display()))?
            .trim()
            .to_string();
        rt.exec_script(&cname, &authorized_key_script(config, &key))?;
    }
    Ok(())
}

/// Disable strict host key checking for the lab user on the control
/// node. Config-gated: acceptable for a throwaway teaching lab, not a
/// pattern for real fleets.
pub fn configure_client(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    if !config.ssh.as_ref().is_some_and(|s| s.skip_host_key_check) {
        return Ok(());
    }
    let cname = config.container_name(&config.control_node);
    let user = &config.user.name;
    let home = home(config);

    let script = format!(
        "mkdir -p {home}/.ssh\n\
         cat > {home}/.ssh/config << 'LABEOF'\n\
         Host *\n    \
         StrictHostKeyChecking no\n    \
         UserKnownHostsFile /dev/null\n    \
         GlobalKnownHostsFile /dev/null\n    \
         LogLevel ERROR\n\
         LABEOF\n\
         chown {user}:{user} {home}/.ssh/config && chmod 600 {home}/.ssh/config"
    );
    rt.exec_script(&cname, &script)
}

fn authorized_key_script(config: &LabConfig, key: &str) -> String {
    let user = &config.user.name;
    let home = home(config);
    format!(
        "mkdir -p {home}/.ssh && echo '{key}' >> {home}/.ssh/authorized_keys && \
         chown -R {user}:{user} {home}/.ssh && chmod 700 {home}/.ssh && \
         chmod 600 {home}/.ssh/authorized_keys"
    )
}
