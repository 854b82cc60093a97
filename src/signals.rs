//! Signal discipline for the supervisor and its children
//! - The supervisor blocks everything except SIGCHLD, which it ignores so the
//!   kernel reaps terminated children without a wait handle
//! - Every child unblocks exactly SIGTERM, SIGSTOP, SIGCONT and SIGUSR1
//!   between fork and exec, whatever mask it inherited
//! - `SignalSender` is the seam through which all signals leave the supervisor

use std::io;
use std::mem::MaybeUninit;
use std::ptr;

use libc::c_int;
use tracing::debug;

use crate::process::Pid;

/// Signals the supervisor uses to control its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    Terminate,
    Stop,
    Continue,
    /// Asks the child to print its own status
    StatusQuery,
}

impl ControlSignal {
    /// The signals every child must be able to receive
    pub const ALL: [ControlSignal; 4] = [
        ControlSignal::Terminate,
        ControlSignal::Stop,
        ControlSignal::Continue,
        ControlSignal::StatusQuery,
    ];

    pub fn as_raw(self) -> c_int {
        match self {
            ControlSignal::Terminate => libc::SIGTERM,
            ControlSignal::Stop => libc::SIGSTOP,
            ControlSignal::Continue => libc::SIGCONT,
            ControlSignal::StatusQuery => libc::SIGUSR1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlSignal::Terminate => "SIGTERM",
            ControlSignal::Stop => "SIGSTOP",
            ControlSignal::Continue => "SIGCONT",
            ControlSignal::StatusQuery => "SIGUSR1",
        }
    }
}

/// Result of a null-signal liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// `kill(pid, 0)` failed with ESRCH
    Gone,
}

/// Delivers signals to child processes
pub trait SignalSender {
    fn send(&self, pid: Pid, signal: ControlSignal) -> io::Result<()>;

    /// Send the null signal; only ESRCH means the process is gone
    fn probe(&self, pid: Pid) -> io::Result<Liveness>;
}

/// `SignalSender` backed by `kill(2)`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSignals;

impl OsSignals {
    fn kill(pid: Pid, signal: c_int) -> io::Result<()> {
        // kill(0, ..) and negative PIDs address whole process groups
        if pid <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to signal non-positive PID {}", pid),
            ));
        }

        // SAFETY: kill(2) takes plain integers and has no memory-safety requirements
        if unsafe { libc::kill(pid, signal) } == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

impl SignalSender for OsSignals {
    fn send(&self, pid: Pid, signal: ControlSignal) -> io::Result<()> {
        debug!("Sending {} to PID {}", signal.name(), pid);
        Self::kill(pid, signal.as_raw())
    }

    fn probe(&self, pid: Pid) -> io::Result<Liveness> {
        match Self::kill(pid, 0) {
            Ok(()) => Ok(Liveness::Alive),
            Err(e) if e.raw_os_error() == Some(libc::ESRCH) => Ok(Liveness::Gone),
            Err(e) => Err(e),
        }
    }
}

fn cvt(result: c_int) -> io::Result<()> {
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Configure the calling process as a supervisor
///
/// Must run before any other thread is started so every thread inherits the mask.
pub fn install_supervisor_discipline() -> io::Result<()> {
    block_all_except_child_termination()?;
    ignore_child_termination()?;
    debug!("Supervisor signal discipline installed");
    Ok(())
}

/// Block every signal except SIGCHLD on the calling thread
pub fn block_all_except_child_termination() -> io::Result<()> {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();

    // SAFETY: the set is initialised by sigfillset before it is read
    unsafe {
        cvt(libc::sigfillset(set.as_mut_ptr()))?;
        cvt(libc::sigdelset(set.as_mut_ptr(), libc::SIGCHLD))?;
        match libc::pthread_sigmask(libc::SIG_BLOCK, set.as_ptr(), ptr::null_mut()) {
            0 => Ok(()),
            errno => Err(io::Error::from_raw_os_error(errno)),
        }
    }
}

/// Set SIGCHLD to SIG_IGN so terminated children never become zombies
///
/// This is process-wide. The supervisor never learns exit status or cause of death.
pub fn ignore_child_termination() -> io::Result<()> {
    // SAFETY: a zeroed sigaction is a valid starting value; the mask is then
    // explicitly emptied and the handler set to SIG_IGN
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = libc::SIG_IGN;
        cvt(libc::sigemptyset(&mut action.sa_mask))?;
        cvt(libc::sigaction(libc::SIGCHLD, &action, ptr::null_mut()))
    }
}

/// Unblock the four control signals on the calling thread
///
/// Runs in a freshly forked child, so it only calls async-signal-safe functions
/// and reports failure as a raw return code instead of allocating an error.
pub(crate) fn apply_child_discipline() -> c_int {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();

    // SAFETY: the set is initialised by sigemptyset before it is read
    unsafe {
        if libc::sigemptyset(set.as_mut_ptr()) == -1 {
            return -1;
        }
        for signal in ControlSignal::ALL {
            if libc::sigaddset(set.as_mut_ptr(), signal.as_raw()) == -1 {
                return -1;
            }
        }
        libc::pthread_sigmask(libc::SIG_UNBLOCK, set.as_ptr(), ptr::null_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked_on_this_thread(signal: c_int) -> bool {
        let mut current = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigemptyset(current.as_mut_ptr());
            libc::pthread_sigmask(libc::SIG_BLOCK, ptr::null(), current.as_mut_ptr());
            libc::sigismember(current.as_ptr(), signal) == 1
        }
    }

    #[test]
    fn test_control_signal_mapping() {
        assert_eq!(ControlSignal::Terminate.as_raw(), libc::SIGTERM);
        assert_eq!(ControlSignal::Stop.as_raw(), libc::SIGSTOP);
        assert_eq!(ControlSignal::Continue.as_raw(), libc::SIGCONT);
        assert_eq!(ControlSignal::StatusQuery.as_raw(), libc::SIGUSR1);
        assert_eq!(ControlSignal::StatusQuery.name(), "SIGUSR1");
    }

    #[test]
    fn test_child_discipline_overrides_supervisor_mask() {
        // Signal masks are per thread; keep the experiment off the test runner's thread
        std::thread::spawn(|| {
            block_all_except_child_termination().unwrap();
            assert!(blocked_on_this_thread(libc::SIGTERM));
            assert!(blocked_on_this_thread(libc::SIGUSR1));
            assert!(!blocked_on_this_thread(libc::SIGCHLD));

            assert_eq!(apply_child_discipline(), 0);
            assert!(!blocked_on_this_thread(libc::SIGTERM));
            assert!(!blocked_on_this_thread(libc::SIGCONT));
            assert!(!blocked_on_this_thread(libc::SIGUSR1));
            // everything else stays blocked
            assert!(blocked_on_this_thread(libc::SIGINT));
            assert!(blocked_on_this_thread(libc::SIGUSR2));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_probe_reports_own_process_alive() {
        let pid = std::process::id() as Pid;
        assert_eq!(OsSignals.probe(pid).unwrap(), Liveness::Alive);
    }

    #[test]
    fn test_non_positive_pid_is_refused() {
        let err = OsSignals.send(0, ControlSignal::Terminate).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(OsSignals.probe(-1).is_err());
    }
}
