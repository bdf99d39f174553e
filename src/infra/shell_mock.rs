//! Test mock for `shell::run_host` and related functions.
//!
//! Installs a thread-local simulation of the container runtime CLI so
//! lifecycle code can be exercised without docker/podman. The simulation
//! tracks containers, networks, images and a per-container filesystem,
//! and records every argument vector for assertions.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

/// Mock response for a host command.
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
}

impl MockResponse {
    pub fn ok(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
        }
    }

    pub fn empty() -> Self {
        Self::ok("")
    }

    pub fn fail() -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
        }
    }

    fn to_output(&self) -> Output {
        Output {
            // Unix exit code encoding: status = code << 8
            status: ExitStatus::from_raw(self.exit_code << 8),
            stdout: self.stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }
}

/// Simulated state of the local container runtime.
#[derive(Default)]
pub struct RuntimeSim {
    /// Container name -> state string ("running" / "exited").
    pub containers: HashMap<String, String>,
    pub networks: HashSet<String>,
    pub images: HashSet<String>,
    /// (container, path) -> file content.
    pub files: HashMap<(String, String), String>,
    /// Containers whose `start` is forced to fail.
    pub fail_start: HashSet<String>,
    /// Every intercepted invocation, program included.
    pub calls: Vec<Vec<String>>,
}

impl RuntimeSim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, name: &str, state: &str) -> Self {
        self.containers.insert(name.to_string(), state.to_string());
        self
    }

    pub fn with_network(mut self, name: &str) -> Self {
        self.networks.insert(name.to_string());
        self
    }

    pub fn with_image(mut self, name: &str) -> Self {
        self.images.insert(name.to_string());
        self
    }

    /// Content of a simulated in-container file, if present.
    pub fn file(&self, container: &str, path: &str) -> Option<&String> {
        self.files.get(&(container.to_string(), path.to_string()))
    }

    /// All recorded invocations whose first runtime argument matches `verb`.
    pub fn calls_with_verb(&self, verb: &str) -> Vec<&Vec<String>> {
        self.calls
            .iter()
            .filter(|argv| argv.len() > 1 && argv[1] == verb)
            .collect()
    }
}

thread_local! {
    static SIM: RefCell<Option<Arc<Mutex<RuntimeSim>>>> = const { RefCell::new(None) };
}

/// Guard that clears the installed simulation on drop.
pub struct MockGuard;

impl Drop for MockGuard {
    fn drop(&mut self) {
        SIM.with(|s| *s.borrow_mut() = None);
    }
}

/// Install a runtime simulation for the current thread.
pub fn install(sim: RuntimeSim) -> (MockGuard, Arc<Mutex<RuntimeSim>>) {
    let shared = Arc::new(Mutex::new(sim));
    SIM.with(|s| *s.borrow_mut() = Some(shared.clone()));
    (MockGuard, shared)
}

/// Try to intercept a host command via the installed simulation.
pub(crate) fn intercept(cmd: &str, args: &[&str]) -> Option<Output> {
    SIM.with(|s| {
        s.borrow()
            .as_ref()
            .map(|sim| dispatch(sim, cmd, args).to_output())
    })
}

fn dispatch(sim: &Arc<Mutex<RuntimeSim>>, cmd: &str, args: &[&str]) -> MockResponse {
    let mut sim = sim.lock().unwrap();
    sim.calls.push(
        std::iter::once(cmd.to_string())
            .chain(args.iter().map(|a| a.to_string()))
            .collect(),
    );

    match cmd {
        // Host-side keygen: materialize a dummy keypair at the -f path so
        // code reading the files back keeps working.
        "ssh-keygen" => {
            if let Some(i) = args.iter().position(|a| *a == "-f") {
                let path = args[i + 1];
                let _ = std::fs::write(path, "-----TEST PRIVATE KEY-----");
                let _ = std::fs::write(format!("{path}.pub"), "ssh-rsa AAAATESTKEY anslab@host");
            }
            MockResponse::empty()
        }
        _ => dispatch_runtime(&mut sim, args),
    }
}

fn dispatch_runtime(sim: &mut RuntimeSim, args: &[&str]) -> MockResponse {
    match args {
        ["--version"] => MockResponse::ok("mock runtime version 1.0"),

        ["network", "inspect", net] => exists_response(sim.networks.contains(*net)),
        ["network", "create", net] => {
            sim.networks.insert(net.to_string());
            MockResponse::empty()
        }
        ["network", "rm", net] => exists_response(sim.networks.remove(*net)),

        ["image", "inspect", image] => exists_response(sim.images.contains(*image)),

        ["inspect", "-f", _, name] => match sim.containers.get(*name) {
            Some(state) => MockResponse::ok(state),
            None => MockResponse::fail(),
        },
        ["inspect", name] => exists_response(sim.containers.contains_key(*name)),

        ["run", rest @ ..] => {
            let name = flag_value(rest, "--name").unwrap_or_default();
            sim.containers.insert(name, "running".to_string());
            MockResponse::empty()
        }

        ["start", name] => {
            if sim.fail_start.contains(*name) || !sim.containers.contains_key(*name) {
                return MockResponse::fail();
            }
            sim.containers
                .insert(name.to_string(), "running".to_string());
            MockResponse::empty()
        }
        ["stop", name] => match sim.containers.get_mut(*name) {
            Some(state) => {
                *state = "exited".to_string();
                MockResponse::empty()
            }
            None => MockResponse::fail(),
        },
        ["rm", "-f", name] => exists_response(sim.containers.remove(*name).is_some()),

        ["exec", name, "bash", "-lc", script] => {
            if !sim.containers.contains_key(*name) {
                return MockResponse::fail();
            }
            apply_script(sim, name, script);
            MockResponse::empty()
        }
        ["exec", name, ..] => exists_response(sim.containers.contains_key(*name)),

        ["cp", src, dest] => {
            let Some((name, path)) = dest.split_once(':') else {
                return MockResponse::fail();
            };
            match std::fs::read_to_string(src) {
                Ok(content) => {
                    sim.files
                        .insert((name.to_string(), path.to_string()), content);
                    MockResponse::empty()
                }
                Err(_) => MockResponse::fail(),
            }
        }

        ["build", rest @ ..] => {
            if let Some(tag) = flag_value(rest, "-t") {
                sim.images.insert(tag);
            }
            MockResponse::empty()
        }

        _ => MockResponse::empty(),
    }
}

fn exists_response(exists: bool) -> MockResponse {
    if exists {
        MockResponse::empty()
    } else {
        MockResponse::fail()
    }
}

fn flag_value(args: &[&str], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| *a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|v| v.to_string())
}

// ── In-container script simulation ──────────────────────────────────────
//
// Lab scripts are generated from a small set of shapes (mkdir/echo-append/
// heredoc-write/marker-guarded append). The simulation handles exactly
// those shapes against the per-container filesystem.

fn apply_script(sim: &mut RuntimeSim, container: &str, script: &str) {
    let lines: Vec<&str> = script.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if let Some(cmd) = line.strip_suffix("<< 'LABEOF'").map(str::trim) {
            // Collect the heredoc body.
            let mut body = Vec::new();
            i += 1;
            while i < lines.len() && lines[i] != "LABEOF" {
                body.push(lines[i]);
                i += 1;
            }
            let body = format!("{}\n", body.join("\n"));
            apply_heredoc(sim, container, cmd, &body);
        } else {
            for piece in line.split(" && ") {
                apply_simple(sim, container, piece.trim());
            }
        }
        i += 1;
    }
}

fn apply_heredoc(sim: &mut RuntimeSim, container: &str, cmd: &str, body: &str) {
    // grep -q 'MARKER' path || cat >> path << 'LABEOF'
    if let Some(rest) = cmd.strip_prefix("grep -q ") {
        let Some(marker) = quoted(rest) else { return };
        let Some(path) = target_after(cmd, ">> ") else {
            return;
        };
        if !file_contains(sim, container, &path, &marker) {
            append_file(sim, container, &path, body);
        }
        return;
    }
    // cat > path << 'LABEOF'
    if let Some(rest) = cmd.strip_prefix("cat > ") {
        let path = rest.trim().to_string();
        write_file(sim, container, &path, body);
    }
}

fn apply_simple(sim: &mut RuntimeSim, container: &str, piece: &str) {
    if piece.starts_with("mkdir") || piece.starts_with("chown") || piece.starts_with("chmod") {
        return;
    }

    if let Some(path) = piece.strip_prefix("touch ") {
        let key = (container.to_string(), path.trim().to_string());
        sim.files.entry(key).or_default();
        return;
    }

    // grep -q 'MARKER' path || echo 'content' >> path
    if let Some(rest) = piece.strip_prefix("grep -q ") {
        let Some(marker) = quoted(rest) else { return };
        let Some(guarded) = piece.split_once("|| ").map(|(_, g)| g.trim()) else {
            return;
        };
        if let (Some(content), Some(path)) = (quoted(guarded), target_after(guarded, ">> ")) {
            if !file_contains(sim, container, &path, &marker) {
                append_file(sim, container, &path, &format!("{content}\n"));
            }
        }
        return;
    }

    // echo 'content' >> path  /  echo 'content' > path
    if piece.starts_with("echo ") {
        let Some(content) = quoted(piece) else { return };
        if let Some(path) = target_after(piece, ">> ") {
            append_file(sim, container, &path, &format!("{content}\n"));
        } else if let Some(path) = target_after(piece, "> ") {
            write_file(sim, container, &path, &format!("{content}\n"));
        }
    }
}

/// First single-quoted payload in a command fragment.
fn quoted(s: &str) -> Option<String> {
    let start = s.find('\'')? + 1;
    let end = start + s[start..].find('\'')?;
    Some(s[start..end].to_string())
}

/// Redirect target following `marker` ("> " or ">> "), last occurrence.
fn target_after(s: &str, marker: &str) -> Option<String> {
    let idx = s.rfind(marker)?;
    // Reject ">> " matches when looking for "> ".
    if marker == "> " && idx > 0 && s.as_bytes()[idx - 1] == b'>' {
        return None;
    }
    let rest = s[idx + marker.len()..].trim();
    Some(rest.split_whitespace().next()?.to_string())
}

fn file_contains(sim: &RuntimeSim, container: &str, path: &str, needle: &str) -> bool {
    sim.file(container, path)
        .map(|c| c.contains(needle))
        .unwrap_or(false)
}

fn append_file(sim: &mut RuntimeSim, container: &str, path: &str, content: &str) {
    sim.files
        .entry((container.to_string(), path.to_string()))
        .or_default()
        .push_str(content);
}

fn write_file(sim: &mut RuntimeSim, container: &str, path: &str, content: &str) {
    sim.files
        .insert((container.to_string(), path.to_string()), content.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_append_and_overwrite() {
        let mut sim = RuntimeSim::new().with_container("c1", "running");
        apply_script(&mut sim, "c1", "mkdir -p /tmp && echo 'one' >> /tmp/f");
        apply_script(&mut sim, "c1", "echo 'two' >> /tmp/f");
        assert_eq!(sim.file("c1", "/tmp/f").unwrap(), "one\ntwo\n");

        apply_script(&mut sim, "c1", "echo 'fresh' > /tmp/f");
        assert_eq!(sim.file("c1", "/tmp/f").unwrap(), "fresh\n");
    }

    #[test]
    fn test_heredoc_overwrite() {
        let mut sim = RuntimeSim::new().with_container("c1", "running");
        let script = "cat > /etc/x << 'LABEOF'\nline1\nline2\nLABEOF\nchmod 600 /etc/x";
        apply_script(&mut sim, "c1", script);
        assert_eq!(sim.file("c1", "/etc/x").unwrap(), "line1\nline2\n");
    }

    #[test]
    fn test_marker_guarded_append_is_idempotent() {
        let mut sim = RuntimeSim::new().with_container("c1", "running");
        let script = "grep -q 'MARK' /rc || cat >> /rc << 'LABEOF'\n# MARK\nexport X=1\nLABEOF";
        apply_script(&mut sim, "c1", script);
        apply_script(&mut sim, "c1", script);
        assert_eq!(sim.file("c1", "/rc").unwrap().matches("MARK").count(), 1);
    }

    #[test]
    fn test_runtime_verbs() {
        let mut sim = RuntimeSim::new().with_network("net1");
        assert_eq!(
            dispatch_runtime(&mut sim, &["network", "inspect", "net1"]).exit_code,
            0
        );
        assert_eq!(
            dispatch_runtime(&mut sim, &["network", "inspect", "other"]).exit_code,
            1
        );
        dispatch_runtime(
            &mut sim,
            &["run", "-d", "--name", "c1", "--hostname", "h", "img"],
        );
        assert_eq!(sim.containers.get("c1").unwrap(), "running");
        dispatch_runtime(&mut sim, &["stop", "c1"]);
        assert_eq!(sim.containers.get("c1").unwrap(), "exited");
        dispatch_runtime(&mut sim, &["rm", "-f", "c1"]);
        assert!(sim.containers.is_empty());
    }
}
