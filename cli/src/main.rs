//! kitbag CLI - runs one helper per invocation and prints the result.
//!
//! Logs go to stderr so stdout stays clean for piping. The filter comes from
//! `RUST_LOG`, then `[log] level` in `~/.kitbag/config.toml`, then `warn`.

mod commands;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use kitbag_config::KitbagConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::Cli;

fn init_tracing(config: Option<&KitbagConfig>) {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            let level = config.and_then(KitbagConfig::log_level)?;
            EnvFilter::try_new(&level)
                .inspect_err(|e| eprintln!("Ignoring invalid log level '{level}': {e}"))
                .ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = KitbagConfig::load();
    let config = loaded.as_ref().ok().and_then(Option::as_ref);
    init_tracing(config);

    if let Err(e) = &loaded {
        tracing::warn!(path = %e.path().display(), "Using default settings: {e}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli.command.run(&mut out)?;
    out.flush()?;
    Ok(())
}
