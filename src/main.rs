//! lvbuild CLI - MicroPython + LVGL firmware build orchestrator
//!
//! Entry point for the lvbuild command-line application.

use clap::Parser;

use lvbuild::cli::output::{display_error, exit_code, OutputConfig};
use lvbuild::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Apply output configuration globally
    let output_config = OutputConfig::new(cli.quiet, cli.json, cli.verbose);
    output_config.apply_global();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(output_config.log_level().into()),
        )
        .init();

    // Run the command; a failed build step exits with the child's own code
    if let Err(e) = cli.run().await {
        display_error(&e);
        std::process::exit(exit_code(&e));
    }
}
