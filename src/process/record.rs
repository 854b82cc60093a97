use std::fmt;

/// OS process identifier, as used by `kill(2)`
pub type Pid = libc::pid_t;

/// Scheduling state of a tracked child, as last set by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Stopped,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Running => f.write_str("running"),
            ProcessStatus::Stopped => f.write_str("stopped"),
        }
    }
}

/// One tracked child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pid: Pid,
    path: String,
    /// Set by `stop`, cleared by `resume`
    pub stopped: bool,
}

impl ProcessRecord {
    pub(crate) fn new(pid: Pid, path: String) -> Self {
        Self {
            pid,
            path,
            stopped: false,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Executable path the child was spawned from
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> ProcessStatus {
        if self.stopped {
            ProcessStatus::Stopped
        } else {
            ProcessStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_running() {
        let record = ProcessRecord::new(42, "/bin/sleep".to_string());
        assert_eq!(record.pid(), 42);
        assert_eq!(record.path(), "/bin/sleep");
        assert!(!record.stopped);
        assert_eq!(record.status(), ProcessStatus::Running);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ProcessStatus::Running.to_string(), "running");
        assert_eq!(ProcessStatus::Stopped.to_string(), "stopped");
    }
}
