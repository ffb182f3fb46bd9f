//! Error types for command dispatch

use std::error::Error;
use std::fmt::{self, Debug};

/// Marker trait for `CommandDispatcher` errors
pub trait DispatchError: Debug + Error + Send + Sync + 'static {
    /// Returns the kind of this error
    fn kind(&self) -> DispatchErrorKind;
}

/// The kind of dispatch error.
///
/// `ServiceNotFound` and `MemberLeft` are expected transients from membership
/// churn; callers swallow them and rely on the next membership-change event
/// to self-correct. Everything else propagates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DispatchErrorKind {
    /// The target member does not host the addressed service.
    ServiceNotFound,

    /// The target member left the group mid-dispatch.
    MemberLeft,

    /// Other/unknown error
    Other,
}

impl DispatchErrorKind {
    /// Whether errors of this kind are benign membership-churn transients.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::ServiceNotFound | Self::MemberLeft)
    }
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
