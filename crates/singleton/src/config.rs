//! Configuration for singleton coordination

use soloist_membership::ServiceId;

use crate::error::SingletonError;

/// Configuration for a [`crate::SingletonCoordinator`].
#[derive(Debug, Clone)]
pub struct SingletonConfig {
    service: ServiceId,
    quorum: usize,
}

impl SingletonConfig {
    /// Create a configuration for `service` with the default quorum of 1.
    pub fn new(service: impl Into<ServiceId>) -> Self {
        Self {
            service: service.into(),
            quorum: 1,
        }
    }

    /// Set the minimum candidate count required before an election may
    /// proceed; below it the service is stopped everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::InvalidQuorum`] if `quorum` is zero.
    pub fn with_quorum(mut self, quorum: usize) -> Result<Self, SingletonError> {
        if quorum < 1 {
            return Err(SingletonError::InvalidQuorum(quorum));
        }
        self.quorum = quorum;
        Ok(self)
    }

    /// The identity of the coordinated service.
    #[must_use]
    pub const fn service(&self) -> &ServiceId {
        &self.service
    }

    /// The configured quorum.
    #[must_use]
    pub const fn quorum(&self) -> usize {
        self.quorum
    }
}

impl From<ServiceId> for SingletonConfig {
    fn from(service: ServiceId) -> Self {
        Self::new(service)
    }
}
