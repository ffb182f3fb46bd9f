//! In-memory provider registry

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use soloist_membership::{Member, ServiceId};
use soloist_registry::{ProviderListener, ProviderRegistry, Registration};

use crate::cluster::MemoryCluster;
use crate::error::MemoryRegistryError;

/// Per-member provider registry backed by the cluster hub.
pub struct MemoryProviderRegistry<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    member: Member,
    cluster: MemoryCluster<C, R>,
}

impl<C, R> MemoryProviderRegistry<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub(crate) const fn new(member: Member, cluster: MemoryCluster<C, R>) -> Self {
        Self { member, cluster }
    }
}

#[async_trait]
impl<C, R> ProviderRegistry for MemoryProviderRegistry<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Error = MemoryRegistryError;
    type Registration = MemoryRegistration<C, R>;

    async fn register(
        &self,
        service: ServiceId,
        listener: Arc<dyn ProviderListener>,
    ) -> Result<Self::Registration, Self::Error> {
        {
            let mut state = self.cluster.inner.state.lock();
            if !state.members.contains(&self.member) {
                return Err(MemoryRegistryError::UnknownMember(self.member.clone()));
            }

            let entry = state.services.entry(service.clone()).or_default();
            entry.providers.insert(self.member.clone());
            entry.listeners.push((self.member.clone(), listener));
        }

        info!(%service, member = %self.member, "registered provider");

        self.cluster.publish(&service).await;

        Ok(MemoryRegistration {
            service,
            member: self.member.clone(),
            cluster: self.cluster.clone(),
        })
    }
}

/// Active registration handle; closing deregisters the member and notifies
/// the remaining listeners.
pub struct MemoryRegistration<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    service: ServiceId,
    member: Member,
    cluster: MemoryCluster<C, R>,
}

#[async_trait]
impl<C, R> Registration for MemoryRegistration<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    async fn close(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let changed = {
            let mut state = self.cluster.inner.state.lock();
            state.services.get_mut(&self.service).is_some_and(|entry| {
                let was_provider = entry.providers.remove(&self.member);
                entry.listeners.retain(|(m, _)| m != &self.member);
                was_provider
            })
        };

        if changed {
            debug!(service = %self.service, member = %self.member, "deregistered provider");
            self.cluster.publish(&self.service).await;
        }

        Ok(())
    }
}
