//! `metacoin` command line front end
//!
//! Operates a question market persisted as a JSON state file. Every
//! invocation loads the file, runs one operation and writes it back when the
//! operation committed.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Cli;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let stdout = std::io::stdout();
    commands::run(&cli, &mut stdout.lock())
}
