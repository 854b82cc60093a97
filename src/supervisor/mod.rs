/// Supervisor context and the operations the console dispatches to
/// - spawn: fork/exec a child and provisionally register it
/// - lifecycle: terminate, stop, resume, status query, quit
/// - reconcile: prune records whose process has disappeared
///
/// Everything runs on the single control thread; nothing here is reentrant.

pub mod lifecycle;
pub mod reconcile;
pub mod spawn;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::io;

use tracing::{error, warn};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::process::{Pid, ProcessRegistry};
use crate::signals::{ControlSignal, OsSignals, SignalSender};

pub use lifecycle::QuitReport;
pub use reconcile::{Listing, ListingRow};
pub use spawn::{Clock, ForkExecLauncher, Launcher, LivenessPolicy, SystemClock};

/// Outcome of a single supervisor command, rendered for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Spawned { pid: Pid },
    /// The liveness probe found no such process after the spawn delay
    ExitedEarly { pid: Pid },
    Killed { pid: Pid },
    Stopped { pid: Pid },
    AlreadyStopped { pid: Pid },
    Resumed { pid: Pid },
    AlreadyRunning { pid: Pid },
    StatusRequested { pid: Pid },
    NoSuchProcess { pid: Pid },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Spawned { pid } => write!(f, "a process with PID {} was spawned", pid),
            Report::ExitedEarly { .. } => write!(
                f,
                "error in executing the program, or the program exited instantly; nothing was added to the process list"
            ),
            Report::Killed { pid } => write!(f, "the process with PID {} was killed", pid),
            Report::Stopped { pid } => write!(f, "the process with PID {} was stopped", pid),
            Report::AlreadyStopped { pid } => {
                write!(f, "the process with PID {} is already stopped", pid)
            }
            Report::Resumed { pid } => write!(f, "the process with PID {} was resumed", pid),
            Report::AlreadyRunning { pid } => {
                write!(f, "the process with PID {} is already running", pid)
            }
            Report::StatusRequested { pid } => {
                write!(f, "status request sent to the process with PID {}", pid)
            }
            Report::NoSuchProcess { pid } => write!(f, "no process with PID {}", pid),
        }
    }
}

/// Explicit supervisor context: the registry plus every OS-facing collaborator
pub struct Supervisor {
    registry: ProcessRegistry,
    signals: Box<dyn SignalSender>,
    launcher: Box<dyn Launcher>,
    clock: Box<dyn Clock>,
    policy: LivenessPolicy,
}

impl Supervisor {
    /// Supervisor wired to the real OS
    pub fn new(config: &SupervisorConfig) -> Result<Self, SupervisorError> {
        Ok(Self::with_parts(
            ProcessRegistry::create()?,
            Box::new(OsSignals),
            Box::new(ForkExecLauncher),
            Box::new(SystemClock),
            LivenessPolicy::from_config(config),
        ))
    }

    pub fn with_parts(
        registry: ProcessRegistry,
        signals: Box<dyn SignalSender>,
        launcher: Box<dyn Launcher>,
        clock: Box<dyn Clock>,
        policy: LivenessPolicy,
    ) -> Self {
        Self {
            registry,
            signals,
            launcher,
            clock,
            policy,
        }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    fn send(&self, pid: Pid, signal: ControlSignal) -> Result<(), SupervisorError> {
        self.signals
            .send(pid, signal)
            .map_err(|source| signal_error(pid, signal.name(), source))
    }
}

impl Drop for Supervisor {
    /// Terminate every child that is still tracked
    fn drop(&mut self) {
        if self.registry.is_empty() {
            return;
        }

        warn!(
            "Supervisor dropped with {} tracked process(es); terminating them",
            self.registry.len()
        );
        let report = self.quit_all();
        for failure in &report.failures {
            error!("Cleanup on drop: {}", failure);
        }
    }
}

pub(crate) fn signal_error(pid: Pid, signal: &'static str, source: io::Error) -> SupervisorError {
    SupervisorError::Signal {
        pid,
        signal,
        source,
    }
}
