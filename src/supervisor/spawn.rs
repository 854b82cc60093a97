use std::ffi::CString;
use std::io;
use std::ptr;
use std::time::Duration;

use libc::c_char;
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::process::Pid;
use crate::signals::{self, Liveness};

use super::{Report, Supervisor};

/// Exit status of a child whose `execv` failed
pub const EXEC_FAILURE_STATUS: libc::c_int = 255;

/// Creates child processes running a given program
pub trait Launcher {
    /// Start `argv[0]` with `argv` as its argument vector and return the child PID
    ///
    /// Success only means the process was created, not that the program started.
    fn launch(&self, argv: &[String]) -> Result<Pid, SupervisorError>;
}

/// Blocks the control thread for a given duration
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Registration heuristic: wait a fixed interval, then probe once
///
/// A child that exec'd a bad path and a program that finished within the delay
/// look identical; both are reported as exited early and never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    pub probe_delay: Duration,
}

impl LivenessPolicy {
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            probe_delay: config.probe_delay(),
        }
    }
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            probe_delay: Duration::from_millis(100),
        }
    }
}

/// `Launcher` built on fork(2) and execv(2)
///
/// The path is used verbatim; there is no PATH search.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkExecLauncher;

impl Launcher for ForkExecLauncher {
    fn launch(&self, argv: &[String]) -> Result<Pid, SupervisorError> {
        // Build every C string before forking; the child must not allocate
        let c_args = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes()).map_err(|_| SupervisorError::InvalidPath(arg.clone()))
            })
            .collect::<Result<Vec<CString>, _>>()?;
        let path = c_args.first().ok_or(SupervisorError::EmptyPath)?;

        let mut c_argv: Vec<*const c_char> = c_args.iter().map(|arg| arg.as_ptr()).collect();
        c_argv.push(ptr::null());

        // SAFETY: between fork and exec the child only calls async-signal-safe
        // functions (pthread_sigmask, execv, _exit) on memory prepared above
        match unsafe { libc::fork() } {
            -1 => Err(SupervisorError::Fork(io::Error::last_os_error())),
            0 => unsafe {
                // A failed unblock still lets the program run; the controller
                // just may not reach it with every signal
                signals::apply_child_discipline();
                libc::execv(path.as_ptr(), c_argv.as_ptr());
                libc::_exit(EXEC_FAILURE_STATUS)
            },
            pid => {
                debug!("Forked child {} for {:?}", pid, argv[0]);
                Ok(pid)
            }
        }
    }
}

impl Supervisor {
    /// Spawn `argv[0]` and register it if it still exists after the probe delay
    pub fn spawn(&mut self, argv: &[String]) -> Result<Report, SupervisorError> {
        let path = match argv.first() {
            Some(path) if !path.is_empty() => path.as_str(),
            _ => return Err(SupervisorError::EmptyPath),
        };

        info!("Spawning {} with {} argument(s)", path, argv.len() - 1);
        let pid = self.launcher.launch(argv)?;

        self.clock.sleep(self.policy.probe_delay);

        match self.signals.probe(pid) {
            Ok(Liveness::Alive) => {}
            Ok(Liveness::Gone) => {
                warn!(
                    "PID {} ({}) was gone after {:?}; not registering it",
                    pid, path, self.policy.probe_delay
                );
                return Ok(Report::ExitedEarly { pid });
            }
            Err(e) => {
                // Only ESRCH counts as death
                warn!("Liveness probe for PID {} failed: {}; assuming it is alive", pid, e);
            }
        }

        self.registry.insert(pid, path)?;
        info!("Spawned {} as PID {}", path, pid);
        Ok(Report::Spawned { pid })
    }
}
