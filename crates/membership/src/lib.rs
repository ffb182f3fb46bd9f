//! Cluster identity types and the group membership view
//!
//! This crate provides:
//! - Node identity (`Member`) and singleton service identity (`ServiceId`)
//! - The `MembershipView` trait giving each node its own identity and an
//!   ordered snapshot of the currently reachable group
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod member;
pub mod service_id;
pub mod view;

pub use member::Member;
pub use service_id::ServiceId;
pub use view::MembershipView;
