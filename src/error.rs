use std::io;
#[cfg(unix)]
use std::collections::TryReserveError;

use thiserror::Error;

#[cfg(unix)]
use crate::process::Pid;

/// Failures of the arena-backed process registry
#[cfg(unix)]
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to allocate a registry slot: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("the record handle no longer refers to a tracked process")]
    InvalidHandle,
}

/// Failures surfaced by supervisor operations
///
/// Lookup misses are not errors; they come back as `Report::NoSuchProcess`.
#[cfg(unix)]
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("exec requires a valid PATH")]
    EmptyPath,

    #[error("invalid path or argument {0:?}: contains a NUL byte")]
    InvalidPath(String),

    #[error("failed to create a child process: {0}")]
    Fork(#[source] io::Error),

    #[error("failed to send {signal} to PID {pid}: {source}")]
    Signal {
        pid: Pid,
        signal: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures while reading or writing the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("configuration I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
