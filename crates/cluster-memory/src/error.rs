//! Error types for the in-memory cluster

use thiserror::Error;

use soloist_dispatch::{DispatchError, DispatchErrorKind};
use soloist_membership::{Member, ServiceId};
use soloist_registry::ProviderRegistryError;

/// Error type for the in-memory provider registry.
#[derive(Debug, Error)]
pub enum MemoryRegistryError {
    /// The registering member is not part of the cluster.
    #[error("member {0} is not part of the cluster")]
    UnknownMember(Member),
}

impl ProviderRegistryError for MemoryRegistryError {}

/// Error type for the in-memory command dispatcher.
#[derive(Debug, Error)]
pub enum MemoryDispatchError {
    /// The target member does not host the addressed service.
    #[error("no handler for service {service} on member {member}")]
    ServiceNotFound {
        /// The addressed service.
        service: ServiceId,
        /// The target member.
        member: Member,
    },

    /// The target member's handler failed executing the command.
    #[error("command handler failed on {member}: {message}")]
    Handler {
        /// The target member.
        member: Member,
        /// The handler's error message.
        message: String,
    },
}

impl DispatchError for MemoryDispatchError {
    fn kind(&self) -> DispatchErrorKind {
        match self {
            Self::ServiceNotFound { .. } => DispatchErrorKind::ServiceNotFound,
            Self::Handler { .. } => DispatchErrorKind::Other,
        }
    }
}
