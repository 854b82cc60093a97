//! Logging configuration using tracing

use std::str::FromStr;

use tracing::Level;

/// Initialize the logging system
///
/// Everything goes to stderr so log lines never land inside the process table.
pub fn init(level: &str, verbose: bool) -> anyhow::Result<()> {
    let max_level = if verbose {
        Level::DEBUG
    } else {
        parse_level(level)
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(())
}

/// Unknown level names fall back to WARN
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::WARN)
}
