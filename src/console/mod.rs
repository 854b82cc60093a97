//! Thin interactive front end over the supervisor
//!
//! Reads one command per line, dispatches it, and prints the outcome. All
//! supervisor state lives in `Supervisor`; this layer only formats text.

pub mod command;
pub mod render;

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

use tracing::{debug, error};

use crate::config::SupervisorConfig;
use crate::supervisor::Supervisor;

pub use command::{Command, ParseError};

/// Presentation settings taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub color: bool,
    pub clear_screen: bool,
    pub max_input_length: usize,
}

impl From<&SupervisorConfig> for ConsoleOptions {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            color: config.color,
            clear_screen: config.clear_screen,
            max_input_length: config.max_input_length,
        }
    }
}

pub struct Console<R, W> {
    supervisor: Supervisor,
    input: R,
    output: W,
    options: ConsoleOptions,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(supervisor: Supervisor, input: R, output: W, options: ConsoleOptions) -> Self {
        Self {
            supervisor,
            input,
            output,
            options,
        }
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Run the command loop until `quit` or end of input
    ///
    /// Both exits terminate every tracked child first.
    pub fn run(&mut self) -> io::Result<()> {
        if self.options.clear_screen {
            self.output.write_all(render::CLEAR_SCREEN.as_bytes())?;
        }
        self.output
            .write_all(render::banner(self.options.color).as_bytes())?;

        loop {
            self.output
                .write_all(render::menu(self.options.color).as_bytes())?;
            self.output.write_all(b"> ")?;
            self.output.flush()?;

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    debug!("End of input; shutting down");
                    writeln!(self.output)?;
                    self.quit()?;
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    writeln!(self.output, "error, the input was not valid UTF-8")?;
                    continue;
                }
                Err(e) => return Err(e),
            }

            let line = line.trim_end_matches(&['\n', '\r'][..]);
            if line.len() > self.options.max_input_length {
                writeln!(
                    self.output,
                    "Error, the input was too large. Input length: {} Maximum permitted length: {}",
                    line.len(),
                    self.options.max_input_length
                )?;
                continue;
            }

            let command = match Command::parse(line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    continue;
                }
            };

            if self.dispatch(command)?.is_break() {
                return Ok(());
            }
        }
    }

    /// Execute one parsed command and print its outcome
    pub fn dispatch(&mut self, command: Command) -> io::Result<ControlFlow<()>> {
        debug!("Dispatching {:?}", command);

        let result = match command {
            Command::Empty => return Ok(ControlFlow::Continue(())),
            Command::Quit => {
                self.quit()?;
                return Ok(ControlFlow::Break(()));
            }
            Command::List => {
                let listing = self.supervisor.reconcile();
                self.output
                    .write_all(render::listing(&listing).as_bytes())?;
                return Ok(ControlFlow::Continue(()));
            }
            Command::Exec(argv) => self.supervisor.spawn(&argv),
            Command::Kill(pid) => self.supervisor.terminate(pid),
            Command::Stop(pid) => self.supervisor.stop(pid),
            Command::Cont(pid) => self.supervisor.resume(pid),
            Command::Info(pid) => self.supervisor.query(pid),
        };

        match result {
            Ok(report) => writeln!(self.output, "{}", report)?,
            Err(e) => {
                error!("Command failed: {}", e);
                writeln!(self.output, "error, {}", e)?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn quit(&mut self) -> io::Result<()> {
        let report = self.supervisor.quit_all();
        self.output
            .write_all(render::quit_summary(&report).as_bytes())?;
        self.output.flush()
    }
}
