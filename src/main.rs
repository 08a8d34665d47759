//! media-cache CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use expiring_media_cache::cli::{Cli, CommandDispatcher};
use expiring_media_cache::ui::{TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pick the log filter for this run.
///
/// `--debug` wins over everything. Otherwise `RUST_LOG` applies when set,
/// and `--quiet` keeps cache activity down to warnings.
fn log_filter(debug: bool, quiet: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("expiring_media_cache=debug");
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if quiet { "warn" } else { "info" };
    EnvFilter::new(format!("expiring_media_cache={}", level))
}

/// Send cache logs to stderr, leaving stdout to command output.
fn init_logging(cli: &Cli) {
    let stderr = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr)
        .with(log_filter(cli.debug, cli.quiet))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }
    init_logging(&cli);
    tracing::debug!(command = ?cli.command, "media-cache invoked");

    let mut ui = TerminalUI::new(cli.quiet);
    let outcome =
        CommandDispatcher::from_cli(&cli).and_then(|dispatcher| dispatcher.dispatch(&cli, &mut ui));

    match outcome {
        Ok(done) => ExitCode::from(done.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
