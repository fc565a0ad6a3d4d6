use color_eyre::eyre::{eyre, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// The TUI owns stdout, so interactive runs log to a file.
    File(&'a Path),
    Stderr,
}

fn env_filter(debug: bool) -> EnvFilter {
    let fallback = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs the global subscriber. `RUST_LOG` wins over `debug`.
pub fn init_logging(target: LogTarget<'_>, debug: bool) -> Result<()> {
    let builder = fmt()
        .with_env_filter(env_filter(debug))
        .with_target(false);

    let installed = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eyre!("could not open log file {}: {e}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| eyre!("logging already initialised: {e}"))
}
