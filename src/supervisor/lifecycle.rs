use tracing::{error, info, warn};

use crate::error::SupervisorError;
use crate::process::Pid;
use crate::signals::ControlSignal;

use super::{Report, Supervisor};

/// Result of terminating every tracked child at shutdown
#[derive(Debug, Default)]
pub struct QuitReport {
    /// Children that were sent SIGTERM
    pub terminated: Vec<Pid>,
    /// Signals that could not be delivered; those records were dropped anyway
    pub failures: Vec<SupervisorError>,
}

impl Supervisor {
    /// Send SIGTERM and forget the record, without waiting for the exit
    ///
    /// If the signal cannot be delivered the record stays; a later
    /// reconciliation pass prunes it once the process is gone.
    pub fn terminate(&mut self, pid: Pid) -> Result<Report, SupervisorError> {
        let Some(handle) = self.registry.find(pid) else {
            info!("kill: PID {} is not tracked", pid);
            return Ok(Report::NoSuchProcess { pid });
        };

        self.send(pid, ControlSignal::Terminate)?;
        self.registry.remove(handle)?;

        info!("Terminated PID {}", pid);
        Ok(Report::Killed { pid })
    }

    pub fn stop(&mut self, pid: Pid) -> Result<Report, SupervisorError> {
        let Some(handle) = self.registry.find(pid) else {
            info!("stop: PID {} is not tracked", pid);
            return Ok(Report::NoSuchProcess { pid });
        };

        if self.registry.get(handle).is_some_and(|record| record.stopped) {
            return Ok(Report::AlreadyStopped { pid });
        }

        self.send(pid, ControlSignal::Stop)?;
        if let Some(record) = self.registry.get_mut(handle) {
            record.stopped = true;
        }

        info!("Stopped PID {}", pid);
        Ok(Report::Stopped { pid })
    }

    pub fn resume(&mut self, pid: Pid) -> Result<Report, SupervisorError> {
        let Some(handle) = self.registry.find(pid) else {
            info!("cont: PID {} is not tracked", pid);
            return Ok(Report::NoSuchProcess { pid });
        };

        if self.registry.get(handle).is_some_and(|record| !record.stopped) {
            return Ok(Report::AlreadyRunning { pid });
        }

        self.send(pid, ControlSignal::Continue)?;
        if let Some(record) = self.registry.get_mut(handle) {
            record.stopped = false;
        }

        info!("Resumed PID {}", pid);
        Ok(Report::Resumed { pid })
    }

    /// Ask the child to print its own status
    ///
    /// The answer goes straight to the child's stdout; nothing comes back here.
    pub fn query(&mut self, pid: Pid) -> Result<Report, SupervisorError> {
        if self.registry.find(pid).is_none() {
            info!("info: PID {} is not tracked", pid);
            return Ok(Report::NoSuchProcess { pid });
        }

        self.send(pid, ControlSignal::StatusQuery)?;
        Ok(Report::StatusRequested { pid })
    }

    /// Terminate and drop every tracked child (used at shutdown)
    ///
    /// Does not wait for any process to exit. Delivery failures are collected
    /// and the pass continues, so the registry always ends empty.
    pub fn quit_all(&mut self) -> QuitReport {
        let handles = self.registry.handles();
        info!("Terminating {} process(es) on quit", handles.len());

        let mut report = QuitReport::default();
        for handle in handles {
            let Some(pid) = self.registry.get(handle).map(|record| record.pid()) else {
                continue;
            };

            match self.send(pid, ControlSignal::Terminate) {
                Ok(()) => report.terminated.push(pid),
                Err(e) => {
                    warn!("Could not terminate PID {} on quit: {}", pid, e);
                    report.failures.push(e);
                }
            }

            if let Err(e) = self.registry.remove(handle) {
                error!("Failed to unregister PID {}: {}", pid, e);
                report.failures.push(e.into());
            }
        }

        report
    }
}
