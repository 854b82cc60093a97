use std::path::PathBuf;

use clap::Parser;

use crate::config::SupervisorConfig;

/// SCEE - run programs as children and control them with signals
#[derive(Parser, Debug)]
#[command(name = "scee", version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "SCEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Milliseconds to wait before deciding whether a spawned child survived
    #[arg(long, value_name = "MS")]
    pub probe_delay_ms: Option<u64>,

    /// Do not clear the terminal on startup
    #[arg(long)]
    pub no_clear: bool,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Command-line flags take precedence over the file
    pub fn apply(&self, config: &mut SupervisorConfig) {
        if let Some(ms) = self.probe_delay_ms {
            config.probe_delay_ms = ms;
        }
        if self.no_clear {
            config.clear_screen = false;
        }
        if self.no_color {
            config.color = false;
        }
    }
}
