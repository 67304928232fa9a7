//! Line formatting for console output.
//!
//! Status lines go to stdout, errors and warnings to stderr. Styling comes
//! from `console`, which drops colors when the output is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// `source -> destination` with the destination highlighted
pub fn format_edge(source: &str, destination: &str) -> String {
    format!("{} -> {}", source, style(destination).green().bold())
}
