//! Cluster singleton coordination
//!
//! Given a group of cooperating nodes, exactly one node runs a designated
//! service at any time, with automatic failover when the active node leaves.
//!
//! This crate provides:
//! - [`SingletonCoordinator`]: per-node state machine driving cluster-wide
//!   elections from provider-set changes
//! - [`ElectionPolicy`] implementations (oldest member, fixed position,
//!   random, preferred members)
//! - The command protocol executed on receiving members
//! - [`LocalSingleton`]: the zero-election single-node variant
//!
//! Group membership, provider registration, and command transport are
//! external collaborators consumed through the `soloist-membership`,
//! `soloist-registry`, and `soloist-dispatch` traits.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod command;
pub mod config;
pub mod coordinator;
pub mod election;
pub mod error;
pub mod listener;
pub mod local;
pub mod primary_cell;
pub mod service;
pub mod state;

pub use command::{CommandResponse, SingletonCommand};
pub use config::SingletonConfig;
pub use coordinator::SingletonCoordinator;
pub use election::{
    ElectionOutcome, ElectionPolicy, OldestMemberPolicy, PositionPolicy, PreferredPolicy,
    RandomPolicy,
};
pub use error::SingletonError;
pub use listener::{ElectionListener, LoggingElectionListener};
pub use local::LocalSingleton;
pub use primary_cell::PrimaryCell;
pub use service::SingletonService;
pub use state::{ServiceStatus, SingletonState};
