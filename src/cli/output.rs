//! Output formatting and progress indicators
//!
//! This module provides the global output mode (quiet / JSON / verbosity),
//! status-prefixed messages, and the spinner shown while a silent child
//! process runs.

use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{LvbuildError, ProcessError};

/// Global output configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Machine-readable output
    pub json: bool,
    /// Verbosity level from `-v` flags
    pub verbose: u8,
}

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Install this configuration for the rest of the process
    pub fn apply_global(self) {
        let _ = OUTPUT.set(self);
    }

    /// Tracing directive matching the verbosity
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

fn current() -> OutputConfig {
    OUTPUT.get().copied().unwrap_or_default()
}

/// Whether quiet mode is active
pub fn is_quiet() -> bool {
    current().quiet
}

/// Whether JSON output is active
pub fn is_json() -> bool {
    current().json
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print a success message unless quiet
pub fn print_success(message: &str) {
    if !is_quiet() && !is_json() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational message unless quiet
pub fn print_info(message: &str) {
    if !is_quiet() && !is_json() {
        println!("{} {message}", status::INFO);
    }
}

/// Print a warning to stderr unless quiet
pub fn print_warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Print an indented detail line unless quiet
pub fn print_detail(message: &str) {
    if !is_quiet() && !is_json() {
        println!("    {message}");
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() || is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Exit status for an error surfaced by a command
///
/// A failed child process propagates its own exit code; anything else is 1.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<ProcessError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<LvbuildError>() {
            return e.exit_code();
        }
    }
    1
}

/// Print an error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        let json = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
            "exit_code": exit_code(error),
        });
        eprintln!("{json}");
        return;
    }

    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("    caused by: {cause}");
    }
}
