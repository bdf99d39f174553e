use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::config::PortMapping;
use crate::infra::shell;

/// Live container state as reported by the runtime. Derived, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
    /// Inspection failed: container absent or runtime unable to report.
    Unavailable,
}

impl ContainerState {
    fn from_inspect(stdout: &str) -> Self {
        match stdout.trim() {
            "running" => Self::Running,
            "exited" => Self::Exited,
            _ => Self::Unavailable,
        }
    }
}

/// Parameters for a `run -d` invocation.
pub struct RunSpec<'a> {
    pub name: &'a str,
    pub hostname: &'a str,
    pub network: &'a str,
    pub ports: &'a [PortMapping],
    /// Host directory → container path bind mount.
    pub volume: Option<(&'a str, &'a str)>,
    pub image: &'a str,
}

/// Thin wrapper over the container runtime CLI (docker or podman).
///
/// Every verb is a structured argument vector through [`shell`]; nothing
/// is interpolated into a host shell. In-container scripts travel as a
/// single argv element to `exec <name> bash -lc <script>`.
pub struct ContainerRuntime {
    bin: String,
}

impl ContainerRuntime {
    pub fn new(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
        }
    }

    /// Verify the runtime binary is present and invocable.
    pub fn ensure_available(&self) -> Result<()> {
        match shell::run_host(&self.bin, &["--version"]) {
            Ok(output) if output.status.success() => Ok(()),
            Ok(_) => bail!("Container runtime '{}' not available", self.bin),
            Err(err) => {
                if which::which(&self.bin).is_err() {
                    bail!("Container runtime '{}' not found in PATH", self.bin);
                }
                Err(err)
            }
        }
    }

    // ── Network ─────────────────────────────────────────────────────────

    pub fn network_exists(&self, network: &str) -> Result<bool> {
        let output = shell::run_host(&self.bin, &["network", "inspect", network])?;
        Ok(output.status.success())
    }

    pub fn create_network(&self, network: &str) -> Result<()> {
        shell::run_host_visible(&self.bin, &["network", "create", network])
            .with_context(|| format!("Failed to create network '{}'", network))
    }

    /// Best-effort: removing an absent network is not an error.
    pub fn remove_network(&self, network: &str) {
        shell::run_host_best_effort(&self.bin, &["network", "rm", network]);
    }

    // ── Containers ──────────────────────────────────────────────────────

    pub fn container_exists(&self, name: &str) -> Result<bool> {
        let output = shell::run_host(&self.bin, &["inspect", name])?;
        Ok(output.status.success())
    }

    pub fn container_state(&self, name: &str) -> Result<ContainerState> {
        let output = shell::run_host(
            &self.bin,
            &["inspect", "-f", "{{.State.Status}}", name],
        )?;
        if !output.status.success() {
            return Ok(ContainerState::Unavailable);
        }
        Ok(ContainerState::from_inspect(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    /// Create and start a container. Fails against an existing name
    /// (re-running `setup` on a provisioned lab aborts here).
    pub fn run_container(&self, spec: &RunSpec) -> Result<()> {
        let mut args: Vec<String> = vec![
            "run".into(),
            "-d".into(),
            "--name".into(),
            spec.name.into(),
            "--hostname".into(),
            spec.hostname.into(),
            "--network".into(),
            spec.network.into(),
        ];
        for p in spec.ports {
            args.push("-p".into());
            args.push(format!("{}:{}", p.host, p.container));
        }
        if let Some((host_dir, container_path)) = spec.volume {
            args.push("-v".into());
            args.push(format!("{}:{}", host_dir, container_path));
        }
        args.push(spec.image.into());

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        shell::run_host_visible(&self.bin, &argv)
            .with_context(|| format!("Failed to run container '{}'", spec.name))
    }

    pub fn start_container(&self, name: &str) -> Result<()> {
        let output = shell::run_host(&self.bin, &["start", name])?;
        if !output.status.success() {
            bail!("Failed to start container '{}'", name);
        }
        Ok(())
    }

    /// Best-effort: stopping an already-stopped container is not an error.
    pub fn stop_container(&self, name: &str) {
        shell::run_host_best_effort(&self.bin, &["stop", name]);
    }

    /// Best-effort: removing an absent container is not an error.
    pub fn remove_container(&self, name: &str) {
        shell::run_host_best_effort(&self.bin, &["rm", "-f", name]);
    }

    // ── Exec / copy ─────────────────────────────────────────────────────

    /// Run a bash script inside a container via a login shell.
    pub fn exec_script(&self, name: &str, script: &str) -> Result<()> {
        shell::run_host_visible(&self.bin, &["exec", name, "bash", "-lc", script])
            .with_context(|| format!("Script failed in container '{}'", name))
    }

    /// Copy a host file into a container.
    pub fn copy_in(&self, src: &Path, name: &str, dest: &str) -> Result<()> {
        let src = src
            .to_str()
            .with_context(|| format!("Non-UTF8 source path: {}", src.display()))?;
        shell::run_host_visible(&self.bin, &["cp", src, &format!("{}:{}", name, dest)])
            .with_context(|| format!("Failed to copy {} into '{}'", src, name))
    }

    // ── Images ──────────────────────────────────────────────────────────

    pub fn image_exists(&self, image: &str) -> Result<bool> {
        let output = shell::run_host(&self.bin, &["image", "inspect", image])?;
        Ok(output.status.success())
    }

    pub fn build_image(&self, tag: &str, containerfile: &Path, context_dir: &Path) -> Result<()> {
        let file = containerfile
            .to_str()
            .context("Non-UTF8 containerfile path")?;
        let ctx = context_dir.to_str().context("Non-UTF8 context path")?;
        shell::run_host_visible(&self.bin, &["build", "-t", tag, "-f", file, ctx])
            .with_context(|| format!("Failed to build image '{}'", tag))
    }
}
