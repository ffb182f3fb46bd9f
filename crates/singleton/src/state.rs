//! Local lifecycle state and cluster-wide state snapshots

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};

use soloist_membership::Member;

/// Lifecycle of the wrapped service on the local member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceStatus {
    /// The local service is not running.
    Stopped = 0,

    /// A start is in flight.
    Starting = 1,

    /// The local service is running; this member is primary.
    Started = 2,

    /// A stop is in flight.
    Stopping = 3,
}

impl ServiceStatus {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Started,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Atomic lifecycle cell. Transitions happen by compare-and-exchange so that
/// concurrent Start/Stop commands collapse to no-ops instead of double
/// starts.
#[derive(Debug)]
pub(crate) struct StatusCell {
    status: AtomicU8,
}

impl StatusCell {
    pub(crate) const fn new() -> Self {
        Self {
            status: AtomicU8::new(ServiceStatus::Stopped as u8),
        }
    }

    pub(crate) fn load(&self) -> ServiceStatus {
        ServiceStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Attempt the `from -> to` transition; `false` means the cell was not
    /// in `from` and nothing changed.
    pub(crate) fn transition(&self, from: ServiceStatus, to: ServiceStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn store(&self, status: ServiceStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }
}

/// Snapshot of cluster-wide singleton state, built fresh per query by
/// probing the whole group. Never cached; the primary can change between
/// queries.
#[derive(Debug, Clone)]
pub struct SingletonState {
    /// Whether the local member is currently primary.
    pub local_primary: bool,

    /// The member that answered the primary probe affirmatively, if any.
    pub primary: Option<Member>,

    /// The current provider set as of the latest registry event.
    pub providers: HashSet<Member>,
}
