use colored::*;

/// Print a diagnostic line to stderr when verbose output is on.
pub fn log_verbose(verbose: bool, message: &str) {
    if verbose {
        eprintln!("{}", format!("[scout] {}", message).dimmed());
    }
}

/// Print an error to stderr. Widget failures are reported here instead of
/// being returned to the caller.
pub fn log_error(message: &str) {
    eprintln!("{} {}", "[scout]".red(), message.red());
}

/// Print a one-line notice for the person at the terminal.
pub fn display_notice(message: &str) {
    println!("{}", message.yellow());
}
