//! Group membership view trait

use async_trait::async_trait;

use crate::Member;

/// Read-only view of the cluster group, owned by an external membership
/// collaborator.
///
/// The view hands out per-call snapshots; callers must not cache them across
/// membership-change events.
#[async_trait]
pub trait MembershipView
where
    Self: Send + Sync + 'static,
{
    /// The identity of the local node. Fixed for the lifetime of the view.
    fn local_member(&self) -> &Member;

    /// Snapshot of the currently reachable group members, ordered by
    /// membership age (oldest first). This order is the deterministic
    /// tie-break input to elections.
    async fn members(&self) -> Vec<Member>;
}
