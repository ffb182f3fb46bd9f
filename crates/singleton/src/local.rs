//! Single-node variant without cluster-wide elections
//!
//! The zero-election fast path for local-only deployments and single-member
//! groups: the local member is always primary and the only provider. The
//! clustered coordinator reduces to this behavior when the group has exactly
//! one member.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use soloist_membership::{Member, ServiceId};

use crate::error::SingletonError;
use crate::listener::{ElectionListener, LoggingElectionListener};
use crate::service::SingletonService;
use crate::state::{ServiceStatus, SingletonState, StatusCell};

/// Degenerate coordinator for a group of one.
///
/// `start()` elects the local member immediately and notifies listeners
/// synchronously, once.
pub struct LocalSingleton<S>
where
    S: SingletonService,
{
    service_id: ServiceId,
    local: Member,
    service: Arc<S>,
    listeners: RwLock<Vec<Arc<dyn ElectionListener>>>,
    status: StatusCell,
}

impl<S> LocalSingleton<S>
where
    S: SingletonService,
{
    /// Create a local singleton for `service_id` on the member `local`.
    pub fn new(service_id: impl Into<ServiceId>, local: Member, service: Arc<S>) -> Self {
        let service_id = service_id.into();
        let logging: Arc<dyn ElectionListener> =
            Arc::new(LoggingElectionListener::new(service_id.clone()));

        Self {
            service_id,
            local,
            service,
            listeners: RwLock::new(vec![logging]),
            status: StatusCell::new(),
        }
    }

    /// Add an election listener.
    pub fn subscribe(&self, listener: Arc<dyn ElectionListener>) {
        self.listeners.write().push(listener);
    }

    /// Start the wrapped service and elect the local member. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::ServiceStart`] if the wrapped service
    /// fails to start.
    pub async fn start(&self) -> Result<(), SingletonError> {
        if !self
            .status
            .transition(ServiceStatus::Stopped, ServiceStatus::Starting)
        {
            debug!(service = %self.service_id, "local singleton already started");
            return Ok(());
        }

        match self.service.start().await {
            Ok(()) => {
                self.status.store(ServiceStatus::Started);
                info!(
                    service = %self.service_id,
                    member = %self.local,
                    "started local singleton service"
                );

                let candidates = vec![self.local.clone()];
                let listeners = self.listeners.read().clone();
                for listener in listeners {
                    listener.elected(&candidates, Some(&self.local));
                }
                Ok(())
            }
            Err(e) => {
                self.status.store(ServiceStatus::Stopped);
                Err(SingletonError::ServiceStart(e))
            }
        }
    }

    /// Stop the wrapped service. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::ServiceStop`] if the wrapped service fails
    /// to stop.
    pub async fn shutdown(&self) -> Result<(), SingletonError> {
        if !self
            .status
            .transition(ServiceStatus::Started, ServiceStatus::Stopping)
        {
            debug!(service = %self.service_id, "local singleton not running");
            return Ok(());
        }

        match self.service.stop().await {
            Ok(()) => {
                self.status.store(ServiceStatus::Stopped);
                info!(service = %self.service_id, "stopped local singleton service");
                Ok(())
            }
            Err(e) => {
                self.status.store(ServiceStatus::Stopped);
                Err(SingletonError::ServiceStop(e))
            }
        }
    }

    /// Always `true`: with a single member there is nobody else to elect.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        true
    }

    /// The provider set: only the local member.
    #[must_use]
    pub fn providers(&self) -> HashSet<Member> {
        HashSet::from([self.local.clone()])
    }

    /// Snapshot of the (single-node) singleton state. Never fails: there is
    /// no group to disagree with.
    #[must_use]
    pub fn singleton_state(&self) -> SingletonState {
        SingletonState {
            local_primary: true,
            primary: Some(self.local.clone()),
            providers: self.providers(),
        }
    }
}
