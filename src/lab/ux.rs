//! Lab UX: the Ansible inventory on the control node and colored shell
//! prompts on every node.

use anyhow::Result;

use crate::config::{LabConfig, NodeDescriptor, NodeRole};
use crate::infra::ui;
use crate::runtime::ContainerRuntime;

/// Marker guarding the PS1 block in `.bashrc`; re-running setup never
/// duplicates the block.
pub const PROMPT_MARKER: &str = "ANSLAB_PS1";

/// Marker guarding the `.bashrc` sourcing line in `.bash_profile`.
const PROFILE_MARKER: &str = "anslab:bashrc";

/// Control node prompt: red. Managed nodes: green.
const CONTROL_PS1: &str = r"\[\e[1;31m\][\u@\h \W]\$\[\e[0m\] ";
const MANAGED_PS1: &str = r"\[\e[1;32m\][\u@\h \W]\$\[\e[0m\] ";

/// Write the static inventory on the control node: managed node names
/// under a `[managed]` group, in configured order.
pub fn seed_inventory(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    let cname = config.container_name(&config.control_node);
    let user = &config.user.name;
    let home = format!("/home/{user}");
    let hosts = config
        .managed_nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let script = format!(
        "cat > {home}/inventory.ini << 'LABEOF'\n\
         [managed]\n\
         {hosts}\n\
         LABEOF\n\
         chown {user}:{user} {home}/inventory.ini && chmod 600 {home}/inventory.ini"
    );
    rt.exec_script(&cname, &script)
}

/// Append the marker-guarded PS1 block to every node's `.bashrc` and
/// make sure `.bash_profile` sources it.
pub fn configure_prompts(rt: &ContainerRuntime, config: &LabConfig) -> Result<()> {
    for node in config.all_nodes() {
        apply_prompt(rt, config, node)?;
    }
    ui::info("Colored bash prompts configured");
    Ok(())
}

fn apply_prompt(rt: &ContainerRuntime, config: &LabConfig, node: &NodeDescriptor) -> Result<()> {
    let cname = config.container_name(node);
    let user = &config.user.name;
    let home = format!("/home/{user}");
    let ps1 = match node.role {
        NodeRole::Control => CONTROL_PS1,
        NodeRole::Managed => MANAGED_PS1,
    };

    let script = format!(
        "touch {home}/.bash_profile\n\
         grep -q '{PROFILE_MARKER}' {home}/.bash_profile || \
         echo 'if [ -f ~/.bashrc ]; then . ~/.bashrc; fi # {PROFILE_MARKER}' >> {home}/.bash_profile\n\
         grep -q '{PROMPT_MARKER}' {home}/.bashrc || cat >> {home}/.bashrc << 'LABEOF'\n\
         # {PROMPT_MARKER}\n\
         export PS1='{ps1}'\n\
         LABEOF\n\
         chown {user}:{user} {home}/.bashrc {home}/.bash_profile"
    );
    rt.exec_script(&cname, &script)
}
