//! In-memory membership view

use std::fmt::Debug;

use async_trait::async_trait;

use soloist_membership::{Member, MembershipView};

use crate::cluster::MemoryCluster;

/// Per-member membership view backed by the cluster hub.
pub struct MemoryMembershipView<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    member: Member,
    cluster: MemoryCluster<C, R>,
}

impl<C, R> MemoryMembershipView<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub(crate) const fn new(member: Member, cluster: MemoryCluster<C, R>) -> Self {
        Self { member, cluster }
    }
}

#[async_trait]
impl<C, R> MembershipView for MemoryMembershipView<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn local_member(&self) -> &Member {
        &self.member
    }

    async fn members(&self) -> Vec<Member> {
        self.cluster.members()
    }
}
