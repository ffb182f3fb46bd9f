//! In-memory cluster implementation for testing and local development
//!
//! A [`MemoryCluster`] routes provider-registry events and dispatched
//! commands between member handles within the same process, implementing the
//! `soloist-membership`, `soloist-registry`, and `soloist-dispatch`
//! collaborator traits without any network.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cluster;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod view;

pub use cluster::{CommandHandlerRef, DispatchRecord, MemberHandle, MemoryCluster};
pub use dispatcher::MemoryDispatcher;
pub use error::{MemoryDispatchError, MemoryRegistryError};
pub use registry::{MemoryProviderRegistry, MemoryRegistration};
pub use view::MemoryMembershipView;
