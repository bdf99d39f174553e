use anyhow::{Context, Result};
use std::process::{Command, Output, Stdio};

/// Run a command on the host, capturing output.
///
/// Fails only when the process cannot be spawned; callers inspect the
/// captured exit status themselves (existence probes rely on it).
pub fn run_host(cmd: &str, args: &[&str]) -> Result<Output> {
    #[cfg(test)]
    if let Some(output) = super::shell_mock::intercept(cmd, args) {
        return Ok(output);
    }

    tracing::debug!("probe: {} {}", cmd, args.join(" "));
    Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run: {} {}", cmd, args.join(" ")))
}

/// Run a command on the host, inheriting stdio (visible to user).
/// A non-zero exit is an error.
pub fn run_host_visible(cmd: &str, args: &[&str]) -> Result<()> {
    #[cfg(test)]
    if let Some(output) = super::shell_mock::intercept(cmd, args) {
        if !output.status.success() {
            anyhow::bail!(
                "Command failed (exit {}): {} {}",
                output.status.code().unwrap_or(-1),
                cmd,
                args.join(" ")
            );
        }
        return Ok(());
    }

    super::ui::cmd_echo(cmd, args);
    let status = Command::new(cmd)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", cmd, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!(
            "Command failed (exit {}): {} {}",
            status.code().unwrap_or(-1),
            cmd,
            args.join(" ")
        );
    }
    Ok(())
}

/// Run a command on the host where failure is an acceptable outcome
/// (stopping an already-stopped container, removing an absent network).
/// Output is discarded; a non-zero exit or spawn failure is logged and
/// swallowed so multi-step teardown sequences run to completion.
pub fn run_host_best_effort(cmd: &str, args: &[&str]) {
    #[cfg(test)]
    if let Some(output) = super::shell_mock::intercept(cmd, args) {
        if !output.status.success() {
            tracing::debug!("ignored failure: {} {}", cmd, args.join(" "));
        }
        return;
    }

    super::ui::cmd_echo(cmd, args);
    match Command::new(cmd)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if !status.success() => {
            tracing::debug!(
                "ignored failure (exit {}): {} {}",
                status.code().unwrap_or(-1),
                cmd,
                args.join(" ")
            );
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!("could not spawn {} ({}); continuing", cmd, err);
        }
    }
}
