//! Deterministic stand-ins for the OS used by supervisor tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::error::SupervisorError;
use crate::process::{Pid, ProcessRegistry};
use crate::signals::{ControlSignal, Liveness, SignalSender};

use super::spawn::{Clock, Launcher, LivenessPolicy};
use super::Supervisor;

pub fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Default)]
struct SignalState {
    sent: Vec<(Pid, ControlSignal)>,
    probes: Vec<Pid>,
    dead: HashSet<Pid>,
    probe_errors: HashMap<Pid, i32>,
    send_errors: HashMap<Pid, i32>,
}

/// Records every signal instead of delivering it
#[derive(Clone, Default)]
pub struct FakeSignals {
    state: Rc<RefCell<SignalState>>,
}

impl FakeSignals {
    /// Make the process vanish without the supervisor noticing
    pub fn kill_silently(&self, pid: Pid) {
        self.state.borrow_mut().dead.insert(pid);
    }

    pub fn fail_probe(&self, pid: Pid, errno: i32) {
        self.state.borrow_mut().probe_errors.insert(pid, errno);
    }

    pub fn fail_send(&self, pid: Pid, errno: i32) {
        self.state.borrow_mut().send_errors.insert(pid, errno);
    }

    pub fn sent(&self) -> Vec<(Pid, ControlSignal)> {
        self.state.borrow().sent.clone()
    }

    pub fn sent_count(&self, pid: Pid, signal: ControlSignal) -> usize {
        self.state
            .borrow()
            .sent
            .iter()
            .filter(|&&entry| entry == (pid, signal))
            .count()
    }

    pub fn probes(&self) -> Vec<Pid> {
        self.state.borrow().probes.clone()
    }
}

impl SignalSender for FakeSignals {
    fn send(&self, pid: Pid, signal: ControlSignal) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(&errno) = state.send_errors.get(&pid) {
            return Err(io::Error::from_raw_os_error(errno));
        }
        state.sent.push((pid, signal));
        Ok(())
    }

    fn probe(&self, pid: Pid) -> io::Result<Liveness> {
        let mut state = self.state.borrow_mut();
        state.probes.push(pid);
        if let Some(&errno) = state.probe_errors.get(&pid) {
            return Err(io::Error::from_raw_os_error(errno));
        }
        if state.dead.contains(&pid) {
            Ok(Liveness::Gone)
        } else {
            Ok(Liveness::Alive)
        }
    }
}

struct LaunchState {
    next_pid: Cell<Pid>,
    launched: RefCell<Vec<Vec<String>>>,
    instant_exits: RefCell<HashSet<String>>,
    fail_next: Cell<bool>,
}

/// Hands out sequential PIDs; selected paths "exit" before the probe
#[derive(Clone)]
pub struct FakeLauncher {
    state: Rc<LaunchState>,
    signals: FakeSignals,
}

impl FakeLauncher {
    pub fn new(signals: FakeSignals) -> Self {
        Self {
            state: Rc::new(LaunchState {
                next_pid: Cell::new(4000),
                launched: RefCell::new(Vec::new()),
                instant_exits: RefCell::new(HashSet::new()),
                fail_next: Cell::new(false),
            }),
            signals,
        }
    }

    pub fn exits_instantly(&self, path: &str) {
        self.state.instant_exits.borrow_mut().insert(path.to_string());
    }

    pub fn fail_next_launch(&self) {
        self.state.fail_next.set(true);
    }

    pub fn peek_next_pid(&self) -> Pid {
        self.state.next_pid.get()
    }

    pub fn launched(&self) -> Vec<Vec<String>> {
        self.state.launched.borrow().clone()
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, argv: &[String]) -> Result<Pid, SupervisorError> {
        if self.state.fail_next.replace(false) {
            return Err(SupervisorError::Fork(io::Error::from_raw_os_error(
                libc::EAGAIN,
            )));
        }

        let pid = self.state.next_pid.get();
        self.state.next_pid.set(pid + 1);
        self.state.launched.borrow_mut().push(argv.to_vec());

        if self.state.instant_exits.borrow().contains(&argv[0]) {
            self.signals.kill_silently(pid);
        }
        Ok(pid)
    }
}

/// Records requested sleeps without sleeping
#[derive(Clone, Default)]
pub struct FakeClock {
    slept: Rc<RefCell<Vec<Duration>>>,
}

impl FakeClock {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

pub struct Fakes {
    pub signals: FakeSignals,
    pub launcher: FakeLauncher,
    pub clock: FakeClock,
}

pub fn fake_supervisor() -> (Supervisor, Fakes) {
    let signals = FakeSignals::default();
    let launcher = FakeLauncher::new(signals.clone());
    let clock = FakeClock::default();

    let supervisor = Supervisor::with_parts(
        ProcessRegistry::new(),
        Box::new(signals.clone()),
        Box::new(launcher.clone()),
        Box::new(clock.clone()),
        LivenessPolicy::default(),
    );

    (
        supervisor,
        Fakes {
            signals,
            launcher,
            clock,
        },
    )
}

/// Supervisor with `count` long-running children already registered
pub fn supervisor_with_children(count: usize) -> (Supervisor, Fakes, Vec<Pid>) {
    let (mut supervisor, fakes) = fake_supervisor();
    let mut pids = Vec::with_capacity(count);
    for i in 0..count {
        let path = format!("/opt/demo/worker{}", i);
        match supervisor.spawn(&argv(&[path.as_str()])) {
            Ok(super::Report::Spawned { pid }) => pids.push(pid),
            other => panic!("fixture spawn failed: {:?}", other),
        }
    }
    (supervisor, fakes, pids)
}
