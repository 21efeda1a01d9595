mod config;
mod inspect;
mod text;

pub use config::*;
pub use inspect::*;
pub use text::*;

use colored::Colorize;
use lumpstack::{DiagnosticLevel, DiagnosticLog};

use crate::println_pad;

/// Prints the warnings and errors collected while a command ran.
pub fn print_diagnostics(log: &DiagnosticLog) {
    if log.is_empty() {
        return;
    }

    println_pad!(
        "\n{} {} warning(s), {} error(s)",
        "⚠️  Diagnostics:".bright_yellow().bold(),
        log.warning_count(),
        log.error_count()
    );
    for diagnostic in log.entries() {
        let level = match diagnostic.level {
            DiagnosticLevel::Warning => diagnostic.level.to_string().bright_yellow(),
            DiagnosticLevel::Error => diagnostic.level.to_string().bright_red(),
        };
        println_pad!("   {} {} {}", "•".bright_cyan(), level, diagnostic.message);
    }
}
