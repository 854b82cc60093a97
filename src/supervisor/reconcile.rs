use tracing::{debug, info, warn};

use crate::error::SupervisorError;
use crate::process::{Pid, ProcessStatus};
use crate::signals::Liveness;

use super::{signal_error, Supervisor};

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub pid: Pid,
    pub status: ProcessStatus,
    pub path: String,
}

/// Registry contents after a reconciliation pass
#[derive(Debug, Default)]
pub struct Listing {
    /// Surviving records, newest first
    pub rows: Vec<ListingRow>,
    /// Stale entries pruned by this pass
    pub removed: usize,
    /// Probes that failed with something other than ESRCH; those records are kept
    pub probe_failures: Vec<SupervisorError>,
}

impl Supervisor {
    /// Probe every record and prune the ones whose process no longer exists
    ///
    /// This is the only place stale entries are detected.
    pub fn reconcile(&mut self) -> Listing {
        let mut listing = Listing::default();

        for handle in self.registry.handles() {
            let Some(pid) = self.registry.get(handle).map(|record| record.pid()) else {
                continue;
            };

            match self.signals.probe(pid) {
                Ok(Liveness::Alive) => {}
                Ok(Liveness::Gone) => match self.registry.remove(handle) {
                    Ok(record) => {
                        debug!("Pruned stale entry for PID {} ({})", pid, record.path());
                        listing.removed += 1;
                    }
                    Err(e) => listing.probe_failures.push(e.into()),
                },
                Err(e) => {
                    warn!("Liveness probe for PID {} failed: {}", pid, e);
                    listing.probe_failures.push(signal_error(pid, "null signal", e));
                }
            }
        }

        listing.rows = self
            .registry
            .iter()
            .map(|(_, record)| ListingRow {
                pid: record.pid(),
                status: record.status(),
                path: record.path().to_string(),
            })
            .collect();

        if listing.removed > 0 {
            info!("Reconciliation removed {} stale entr(ies)", listing.removed);
        }
        listing
    }
}
