/// Process tracking for spawned children
/// Keeps one record per child in a sentinel-anchored, circular registry
/// Records are created by the spawn protocol and removed by kill, quit, or pruning

pub mod record;
pub mod registry;

pub use record::{Pid, ProcessRecord, ProcessStatus};
pub use registry::{ProcessRegistry, RecordHandle};
