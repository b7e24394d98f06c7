//! Archflow CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use archflow_cli::{Args, error_adapter::to_reports};

/// Parse `level`, falling back to `warn` for anything `log` does not know.
fn log_level_filter(level: &str) -> LevelFilter {
    LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    })
}

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = log_level_filter(&args.log_level);
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Archflow");
    debug!(args:?; "Parsed arguments");

    let Err(err) = archflow_cli::run(&args) else {
        info!(output = args.output; "Completed successfully");
        return;
    };

    // One report per diagnostic, so every lexer error shows its own snippet
    let reporter = miette::GraphicalReportHandler::new();
    for report in to_reports(&err) {
        let mut rendered = String::new();
        if reporter.render_report(&mut rendered, &report).is_err() {
            rendered = report.to_string();
        }
        error!("{rendered}");
    }

    process::exit(1);
}
