use colored::Colorize;

const RULE_WIDTH: usize = 45;

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Format a section banner framed by `#` rules
pub fn banner(title: &str) -> String {
    let rule = "#".repeat(RULE_WIDTH);
    format!(
        "\n{}\n  {}\n{}\n",
        rule.dimmed(),
        title.cyan().bold(),
        rule.dimmed()
    )
}

/// Turn colors off for the rest of the process
pub fn disable_colors() {
    colored::control::set_override(false);
}

// ============================================================================
// Tests
// ============================================================================
