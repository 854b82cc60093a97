//! Demo child programs for exercising the supervisor
//!
//! `integers` and `times` print a line every `delay` seconds and answer SIGUSR1
//! with a status line. The signal is turned into a channel message that the
//! program's single main loop consumes, so the handler never touches the
//! counter or writes output itself.

use std::io::Write;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_DELAY_SECS: u64 = 4;
pub const MAX_DELAY_SECS: u64 = 32;
/// Outputs are numbered 0..=LAST_OUTPUT
pub const LAST_OUTPUT: u32 = 128;

/// Description of one demo program
pub struct DemoProgram {
    pub name: &'static str,
    pub description: &'static str,
    /// How the status line describes the program's wellbeing
    pub mood: &'static str,
    pub line: fn(delay: u64, counter: u32) -> String,
}

pub const INTEGERS: DemoProgram = DemoProgram {
    name: "integers",
    description: "A simple program that prints to stdout the integers from 0 to 128 in ascending order, one every 4 seconds or the number of seconds passed as an argument. This value must be in the range [1, 32].",
    mood: "doing just fine",
    line: integers_line,
};

pub const TIMES: DemoProgram = DemoProgram {
    name: "times",
    description: "A simple program that prints to stdout the current time 129 times, once every 4 seconds or the number of seconds given as an argument. This value must be in the range [1, 32].",
    mood: "doing great",
    line: times_line,
};

fn integers_line(delay: u64, counter: u32) -> String {
    format!("\n\tintegers, delay {}: {}", delay, counter)
}

fn times_line(delay: u64, _counter: u32) -> String {
    format!(
        "\n\ttimes, delay {}: {}",
        delay,
        chrono::Local::now().format("%H:%M:%S")
    )
}

impl DemoProgram {
    pub fn status_line(&self, delay: u64, outputs: u32) -> String {
        format!(
            "\n!!! {}, delay {}: {} outputs so far, {} !!!",
            self.name, delay, outputs, self.mood
        )
    }
}

/// Seconds between outputs; anything outside [1, 32] falls back to the default
pub fn parse_delay(arg: Option<&str>) -> u64 {
    arg.and_then(|arg| arg.trim().parse::<u64>().ok())
        .filter(|delay| (1..=MAX_DELAY_SECS).contains(delay))
        .unwrap_or(DEFAULT_DELAY_SECS)
}

/// Forward every SIGUSR1 into a channel read by the main loop
///
/// Must be called from inside a tokio runtime.
pub fn status_requests() -> std::io::Result<mpsc::UnboundedReceiver<()>> {
    let mut requests = signal(SignalKind::user_defined1())?;
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while requests.recv().await.is_some() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Print `LAST_OUTPUT + 1` lines, one per `tick`, answering status requests in between
pub async fn run<W: Write>(
    program: &DemoProgram,
    delay: u64,
    tick: Duration,
    mut requests: mpsc::UnboundedReceiver<()>,
    mut out: W,
) -> std::io::Result<()> {
    writeln!(out, "\n{}", program.description)?;
    out.flush()?;

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut requests_open = true;
    let mut outputs: u32 = 0;

    while outputs <= LAST_OUTPUT {
        tokio::select! {
            biased;

            request = requests.recv(), if requests_open => match request {
                Some(()) => {
                    debug!("{} answering status request", program.name);
                    writeln!(out, "{}", program.status_line(delay, outputs))?;
                    out.flush()?;
                }
                None => requests_open = false,
            },
            _ = ticker.tick() => {
                writeln!(out, "{}", (program.line)(delay, outputs))?;
                out.flush()?;
                outputs += 1;
            }
        }
    }

    Ok(())
}
