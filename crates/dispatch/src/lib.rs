//! Generic command dispatch abstraction for group communication
//!
//! This crate provides a transport-agnostic interface for sending command
//! objects to one or all group members and collecting per-member results.
//! Wire encoding, signing, and connection management are the concern of the
//! concrete dispatcher implementations in separate crates.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;

use async_trait::async_trait;

use soloist_membership::Member;

pub use error::{DispatchError, DispatchErrorKind};

/// Resolution of a single dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome<R> {
    /// The target member executed the command and produced a response.
    Completed(R),

    /// The command was cancelled because the target member departed before
    /// responding. Callers treat this as a successful no-op, never retried.
    Cancelled,
}

impl<R> DispatchOutcome<R> {
    /// Whether this outcome is a departure cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The response, if the command completed.
    #[allow(clippy::missing_const_for_fn)]
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(response) => Some(response),
            Self::Cancelled => None,
        }
    }
}

/// Per-member result of a group dispatch.
pub type MemberResult<R, E> = (Member, Result<DispatchOutcome<R>, E>);

/// A trait for sending commands to group members, scoped to one service.
///
/// Dispatchers are obtained pre-addressed to a singleton service; the command
/// carries no service identity of its own.
#[async_trait]
pub trait CommandDispatcher
where
    Self: Send + Sync + 'static,
{
    /// The command type this dispatcher carries.
    type Command: Clone + Send + Sync + 'static;

    /// The response type produced by executing a command.
    type Response: Send + 'static;

    /// The error type for dispatch operations.
    type Error: DispatchError;

    /// Send a command to a single member and await its result.
    async fn dispatch_to_member(
        &self,
        member: &Member,
        command: Self::Command,
    ) -> Result<DispatchOutcome<Self::Response>, Self::Error>;

    /// Send a command to every current group member and await all results.
    ///
    /// The outer error covers wholesale failure to dispatch; per-member
    /// failures are reported in the individual entries.
    async fn dispatch_to_group(
        &self,
        command: Self::Command,
    ) -> Result<Vec<MemberResult<Self::Response, Self::Error>>, Self::Error>;
}

/// Receiving-side execution of dispatched commands.
///
/// A concrete dispatcher routes each inbound command for a service to the
/// handler the hosting member registered for it.
#[async_trait]
pub trait CommandHandler
where
    Self: Send + Sync + 'static,
{
    /// The command type this handler executes.
    type Command: Send + 'static;

    /// The response type this handler produces.
    type Response: Send + 'static;

    /// Execute a command on the local member.
    async fn handle(
        &self,
        command: Self::Command,
    ) -> Result<Self::Response, Box<dyn std::error::Error + Send + Sync>>;
}
