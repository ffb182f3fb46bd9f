//! Error types for singleton coordination

use thiserror::Error;

use soloist_membership::{Member, ServiceId};

/// Errors surfaced by singleton coordination.
#[derive(Debug, Error)]
pub enum SingletonError {
    /// Quorum configuration error. Raised at configuration time, never
    /// silently clamped.
    #[error("quorum must be at least 1, got {0}")]
    InvalidQuorum(usize),

    /// More than one member answered a primary probe affirmatively. This
    /// indicates a real correctness bug upstream and is never resolved by
    /// picking one claimant arbitrarily.
    #[error("multiple members claim primacy of {service}: {claimants:?}")]
    ConsistencyViolation {
        /// The queried service.
        service: ServiceId,
        /// Every member that answered the probe affirmatively.
        claimants: Vec<Member>,
    },

    /// No member responded as primary. Retryable; typically means the
    /// service has not been started anywhere yet.
    #[error("no primary provider of {0} responded")]
    NoPrimary(ServiceId),

    /// Unexpected dispatch failure, not attributable to membership churn.
    #[error("command dispatch failed: {0}")]
    Dispatch(String),

    /// Provider registration or deregistration failed.
    #[error("provider registration failed: {0}")]
    Registry(String),

    /// The wrapped service failed to start.
    #[error("singleton service start failed: {0}")]
    ServiceStart(Box<dyn std::error::Error + Send + Sync>),

    /// The wrapped service failed to stop.
    #[error("singleton service stop failed: {0}")]
    ServiceStop(Box<dyn std::error::Error + Send + Sync>),
}
