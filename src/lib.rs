pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

#[cfg(unix)]
pub mod console;
#[cfg(unix)]
pub mod demo;
#[cfg(unix)]
pub mod process;
#[cfg(unix)]
pub mod signals;
#[cfg(unix)]
pub mod supervisor;

#[cfg(unix)]
pub use unix::run;

#[cfg(unix)]
mod unix {
    use std::io;

    use anyhow::Context;
    use tracing::info;

    use crate::cli::Cli;
    use crate::config::SupervisorConfig;
    use crate::console::{Console, ConsoleOptions};
    use crate::supervisor::Supervisor;
    use crate::{app, logging, signals};

    /// Run the interactive supervisor until `quit` or end of input
    pub fn run(cli: Cli) -> anyhow::Result<()> {
        let loaded = SupervisorConfig::load(cli.config.as_deref());
        let mut config = loaded.config.clone();
        cli.apply(&mut config);

        logging::init(&config.log_level, cli.verbose)?;
        loaded.report();
        info!("Starting {} v{}", app::APP_NAME, app::APP_VERSION);

        // Before anything else spawns a thread, so every thread inherits the mask
        signals::install_supervisor_discipline()
            .context("failed to install the supervisor signal discipline")?;

        let supervisor =
            Supervisor::new(&config).context("failed to create the process registry")?;

        let stdin = io::stdin();
        let stdout = io::stdout();
        // Dropping the console on any exit path terminates the tracked children
        let mut console = Console::new(
            supervisor,
            stdin.lock(),
            stdout.lock(),
            ConsoleOptions::from(&config),
        );
        console.run().context("console I/O failed")?;

        info!("Supervisor exiting");
        Ok(())
    }
}
