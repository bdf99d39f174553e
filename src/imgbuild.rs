//! Image builder: synthesizes a Containerfile per node role and drives
//! the runtime's `build` subcommand from a scoped temporary directory.
//!
//! All parameters are compile-time constants; the standalone
//! `anslab-imgbuild` binary takes no arguments, and the lifecycle
//! manager's `build` subcommand calls [`build_all`] in-process.

use anyhow::{Context, Result, bail};

use crate::infra::ui;
use crate::runtime::ContainerRuntime;

pub const RUNTIME: &str = "docker";
pub const BASE_IMAGE: &str = "rocky9";
pub const ANSIBLE_USER: &str = "sysansible";

pub const CONTROL_IMAGE_SUFFIX: &str = "ansiblecn";
pub const MANAGED_IMAGE_SUFFIX: &str = "ansiblemn";

/// Build parameters. Defaults mirror the compile-time constants.
pub struct BuildParams {
    pub runtime: String,
    pub base_image: String,
    pub user: String,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            runtime: RUNTIME.to_string(),
            base_image: BASE_IMAGE.to_string(),
            user: ANSIBLE_USER.to_string(),
        }
    }
}

/// Supported base images, mapped to local image references. No registry
/// pull is ever attempted: the lab stays offline-friendly, so the base
/// image must already exist in the runtime's local store.
fn base_image_ref(key: &str) -> Option<&'static str> {
    match key {
        "rocky8" => Some("rockylinux/rockylinux:8"),
        "rocky9" => Some("rockylinux/rockylinux:9"),
        _ => None,
    }
}

/// Image name for a base ref + role suffix, e.g. `rocky9ansiblecn`.
pub fn image_name(base_ref: &str, role_suffix: &str) -> Result<String> {
    let version = base_ref
        .rsplit_once(':')
        .map(|(_, v)| v)
        .with_context(|| format!("Base image reference has no tag: {}", base_ref))?;
    Ok(format!("rocky{}{}", version, role_suffix))
}

/// Synthesize the build recipe for one role.
///
/// Both roles get sshd, a passwordless-sudo user and python; the control
/// role additionally gets ansible-core. Rocky 8 needs the EPEL repo
/// enabled first; Rocky 9 ships ansible-core in AppStream.
pub fn containerfile(base_ref: &str, user: &str, install_ansible: bool) -> String {
    let ansible_install = if !install_ansible {
        String::new()
    } else if base_ref.ends_with(":9") {
        "\nRUN dnf install -y ansible-core && dnf clean all\n".to_string()
    } else {
        "\nRUN dnf install -y epel-release \\\n    && dnf install -y ansible-core \\\n    && dnf clean all\n"
            .to_string()
    };

    format!(
        r#"FROM {base_ref}

RUN dnf install -y \
        sudo \
        openssh-server \
        openssh-clients \
        python3 \
        which \
    && dnf clean all

RUN ssh-keygen -A

RUN useradd -m {user} \
    && echo "{user} ALL=(ALL) NOPASSWD:ALL" > /etc/sudoers.d/{user} \
    && chmod 0440 /etc/sudoers.d/{user}
{ansible_install}
EXPOSE 22

CMD ["/bin/bash", "-c", "rm -f /run/nologin && exec /usr/sbin/sshd -D"]
"#
    )
}

fn build_role(rt: &ContainerRuntime, base_ref: &str, user: &str, role_suffix: &str) -> Result<()> {
    let tag = image_name(base_ref, role_suffix)?;
    let recipe = containerfile(base_ref, user, role_suffix == CONTROL_IMAGE_SUFFIX);

    // Scoped build context: the directory is removed on every exit path.
    let tmpdir = tempfile::Builder::new()
        .prefix("anslab-build-")
        .tempdir()
        .context("Failed to create build context directory")?;
    let containerfile_path = tmpdir.path().join("Containerfile");
    std::fs::write(&containerfile_path, recipe)
        .with_context(|| format!("Failed to write {}", containerfile_path.display()))?;

    rt.build_image(&tag, &containerfile_path, tmpdir.path())?;
    ui::success(&format!("Built image: {}", tag));
    Ok(())
}

/// Build the managed image, then the control image, sequentially.
pub fn build_all(params: &BuildParams) -> Result<()> {
    let rt = ContainerRuntime::new(&params.runtime);
    rt.ensure_available()?;

    let Some(base_ref) = base_image_ref(&params.base_image) else {
        bail!("Unsupported base image: {}", params.base_image);
    };

    if !rt.image_exists(base_ref)? {
        bail!("Base image not found locally: {}", base_ref);
    }

    ui::info(&format!("Runtime      : {}", params.runtime));
    ui::info(&format!("Base image   : {}", base_ref));
    ui::info(&format!("Ansible user : {}", params.user));

    build_role(&rt, base_ref, &params.user, MANAGED_IMAGE_SUFFIX)?;
    build_role(&rt, base_ref, &params.user, CONTROL_IMAGE_SUFFIX)?;

    ui::success("Image build completed successfully");
    Ok(())
}
