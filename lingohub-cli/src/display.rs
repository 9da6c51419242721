//! Display Helpers
//!
//! Terminal output formatting and styling.

use console::style;

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Prints a labelled value, aligned.
pub fn field(label: &str, value: &str) {
    println!("  {:<16} {}", style(label).dim(), value);
}
