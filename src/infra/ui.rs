use colored::Colorize;

// ---------------------------------------------------------------------------
// Colored message helpers
// ---------------------------------------------------------------------------

fn prefix() -> String {
    "[anslab]".bold().cyan().to_string()
}

/// Print an informational message: [anslab] message
pub fn info(msg: &str) {
    println!("{} {}", prefix(), msg);
}

/// Print a success message: [anslab] message (in green)
pub fn success(msg: &str) {
    println!("{} {}", prefix(), msg.green());
}

/// Print an error message: [anslab] message (in red)
pub fn error(msg: &str) {
    eprintln!("{} {}", "[anslab]".bold().red(), msg.red());
}

/// Print a warning message: [anslab] message (in yellow)
pub fn warn(msg: &str) {
    println!("{} {}", prefix(), msg.yellow());
}

/// Print a numbered step: [anslab] Step n/total: message
pub fn step(n: u32, total: u32, msg: &str) {
    println!(
        "\n{} {} {}",
        prefix(),
        format!("Step {}/{}:", n, total).bold().yellow(),
        msg,
    );
}

/// Echo an external invocation (dimmed) so operators can see exactly
/// what the tool runs against the runtime.
pub fn cmd_echo(cmd: &str, args: &[&str]) {
    println!("{}", format!("  $ {} {}", cmd, args.join(" ")).dimmed());
}

// ---------------------------------------------------------------------------
// Sections and status rows
// ---------------------------------------------------------------------------

/// Column widths shared by status/start/stop tables.
pub const ROLE_W: usize = 8;
pub const NODE_W: usize = 12;

/// Print a cyan section title over a rule.
pub fn section(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "-".repeat(60).dimmed());
}

/// Print a table header row (role/node plus trailing columns).
pub fn table_header(extra: &[&str]) {
    println!(
        "{:<role$} {:<node$} {}",
        "ROLE",
        "NODE",
        extra.join(" "),
        role = ROLE_W,
        node = NODE_W,
    );
    println!("{}", "-".repeat(60).dimmed());
}

/// Role label colored by class: control cyan, managed yellow.
pub fn role_label(control: bool) -> String {
    if control {
        format!("{:<w$}", "CONTROL", w = ROLE_W).cyan().to_string()
    } else {
        format!("{:<w$}", "MANAGED", w = ROLE_W).yellow().to_string()
    }
}
