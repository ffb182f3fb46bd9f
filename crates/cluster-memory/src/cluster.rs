//! The shared in-process cluster hub

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use soloist_dispatch::CommandHandler;
use soloist_membership::{Member, ServiceId};
use soloist_registry::ProviderListener;

use crate::dispatcher::MemoryDispatcher;
use crate::registry::MemoryProviderRegistry;
use crate::view::MemoryMembershipView;

/// Shared handle to a registered command handler.
pub type CommandHandlerRef<C, R> = Arc<dyn CommandHandler<Command = C, Response = R>>;

pub(crate) type ServiceKey = (ServiceId, Member);

/// One recorded command dispatch, for test assertions.
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    /// The member whose dispatcher issued the command.
    pub origin: Member,

    /// The member the command was addressed to.
    pub target: Member,

    /// Debug rendering of the dispatched command.
    pub command: String,
}

#[derive(Default)]
pub(crate) struct ServiceEntry {
    pub providers: HashSet<Member>,
    pub listeners: Vec<(Member, Arc<dyn ProviderListener>)>,
}

pub(crate) struct ClusterState<R> {
    pub members: Vec<Member>,
    pub services: HashMap<ServiceId, ServiceEntry>,
    pub rigged_responses: HashMap<ServiceKey, R>,
    pub rigged_cancels: HashSet<ServiceKey>,
    pub dispatch_log: Vec<DispatchRecord>,
}

pub(crate) struct ClusterInner<C, R> {
    pub state: Mutex<ClusterState<R>>,
    /// Command routing table, keyed by (service, member).
    pub handlers: DashMap<ServiceKey, CommandHandlerRef<C, R>>,
    /// Serializes provider-change delivery so listeners never observe
    /// overlapping notifications.
    pub delivery: tokio::sync::Mutex<()>,
}

/// In-process cluster hub routing registry events and commands between
/// member handles. Clones share the same cluster.
pub struct MemoryCluster<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub(crate) inner: Arc<ClusterInner<C, R>>,
}

impl<C, R> Clone for MemoryCluster<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, R> Default for MemoryCluster<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, R> MemoryCluster<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Create an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClusterInner {
                state: Mutex::new(ClusterState {
                    members: Vec::new(),
                    services: HashMap::new(),
                    rigged_responses: HashMap::new(),
                    rigged_cancels: HashSet::new(),
                    dispatch_log: Vec::new(),
                }),
                handlers: DashMap::new(),
                delivery: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Add a member to the group and return its handle. Membership order is
    /// join order (oldest first). Joining is idempotent per name.
    pub fn join(&self, name: impl Into<String>) -> MemberHandle<C, R> {
        let member = Member::new(name);

        {
            let mut state = self.inner.state.lock();
            if !state.members.contains(&member) {
                state.members.push(member.clone());
            }
        }

        info!(%member, "member joined memory cluster");

        MemberHandle {
            member,
            cluster: self.clone(),
        }
    }

    /// Remove a member abruptly (crash semantics): no deregistration, the
    /// member simply disappears from membership, provider sets, and routing.
    /// Listeners of every affected service are notified.
    pub async fn fail(&self, member: &Member) {
        self.inner.handlers.retain(|(_, m), _| m != member);

        let affected: Vec<ServiceId> = {
            let mut state = self.inner.state.lock();
            state.members.retain(|m| m != member);
            state.rigged_responses.retain(|(_, m), _| m != member);
            state.rigged_cancels.retain(|(_, m)| m != member);

            let mut affected = Vec::new();
            for (service, entry) in &mut state.services {
                let was_provider = entry.providers.remove(member);
                entry.listeners.retain(|(m, _)| m != member);
                if was_provider {
                    affected.push(service.clone());
                }
            }
            affected
        };

        warn!(%member, "member failed abruptly");

        for service in affected {
            self.publish(&service).await;
        }
    }

    /// Snapshot of the current members, in join order.
    #[must_use]
    pub fn members(&self) -> Vec<Member> {
        self.inner.state.lock().members.clone()
    }

    /// Snapshot of the current providers of `service`.
    #[must_use]
    pub fn providers(&self, service: &ServiceId) -> HashSet<Member> {
        self.inner
            .state
            .lock()
            .services
            .get(service)
            .map(|entry| entry.providers.clone())
            .unwrap_or_default()
    }

    /// Force every command dispatched to `member` for `service` to resolve
    /// with `response` instead of reaching the member's handler.
    pub fn rig_response(&self, service: impl Into<ServiceId>, member: &Member, response: R) {
        self.inner
            .state
            .lock()
            .rigged_responses
            .insert((service.into(), member.clone()), response);
    }

    /// Force every command dispatched to `member` for `service` to resolve
    /// as cancelled, simulating a departure race.
    pub fn rig_cancelled(&self, service: impl Into<ServiceId>, member: &Member) {
        self.inner
            .state
            .lock()
            .rigged_cancels
            .insert((service.into(), member.clone()));
    }

    /// The dispatches recorded so far.
    #[must_use]
    pub fn dispatch_log(&self) -> Vec<DispatchRecord> {
        self.inner.state.lock().dispatch_log.clone()
    }

    /// Discard the recorded dispatches.
    pub fn clear_dispatch_log(&self) {
        self.inner.state.lock().dispatch_log.clear();
    }

    /// Notify every listener of `service` of its current provider set,
    /// serially, in registration order.
    pub(crate) async fn publish(&self, service: &ServiceId) {
        let _delivery = self.inner.delivery.lock().await;

        let (providers, listeners) = {
            let state = self.inner.state.lock();
            let Some(entry) = state.services.get(service) else {
                return;
            };
            let listeners: Vec<Arc<dyn ProviderListener>> = entry
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (entry.providers.clone(), listeners)
        };

        debug!(
            %service,
            providers = providers.len(),
            listeners = listeners.len(),
            "publishing provider change"
        );

        for listener in listeners {
            listener.on_providers_changed(providers.clone()).await;
        }
    }
}

/// A member's view of the cluster: factory for the per-node collaborator
/// implementations.
pub struct MemberHandle<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    member: Member,
    cluster: MemoryCluster<C, R>,
}

impl<C, R> MemberHandle<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// The identity of this member.
    #[must_use]
    pub const fn member(&self) -> &Member {
        &self.member
    }

    /// The cluster this member belongs to.
    #[must_use]
    pub const fn cluster(&self) -> &MemoryCluster<C, R> {
        &self.cluster
    }

    /// The membership view collaborator for this member.
    #[must_use]
    pub fn view(&self) -> MemoryMembershipView<C, R> {
        MemoryMembershipView::new(self.member.clone(), self.cluster.clone())
    }

    /// The provider registry collaborator for this member.
    #[must_use]
    pub fn registry(&self) -> MemoryProviderRegistry<C, R> {
        MemoryProviderRegistry::new(self.member.clone(), self.cluster.clone())
    }

    /// A command dispatcher scoped to `service`, originating from this
    /// member.
    #[must_use]
    pub fn dispatcher(&self, service: impl Into<ServiceId>) -> MemoryDispatcher<C, R> {
        MemoryDispatcher::new(service.into(), self.member.clone(), self.cluster.clone())
    }

    /// Register the handler executing inbound commands for `service` on
    /// this member. Must happen before the member can receive commands.
    pub fn register_handler(
        &self,
        service: impl Into<ServiceId>,
        handler: CommandHandlerRef<C, R>,
    ) {
        self.cluster
            .inner
            .handlers
            .insert((service.into(), self.member.clone()), handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use async_trait::async_trait;
    use soloist_dispatch::{CommandDispatcher, DispatchOutcome};
    use soloist_registry::{ProviderRegistry, Registration};

    struct EchoHandler;

    #[async_trait]
    impl CommandHandler for EchoHandler {
        type Command = String;
        type Response = String;

        async fn handle(
            &self,
            command: String,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(command)
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        seen: parking_lot::Mutex<Vec<HashSet<Member>>>,
    }

    #[async_trait]
    impl ProviderListener for RecordingListener {
        async fn on_providers_changed(&self, providers: HashSet<Member>) {
            self.seen.lock().push(providers);
        }
    }

    fn cluster() -> MemoryCluster<String, String> {
        MemoryCluster::new()
    }

    #[tokio::test]
    async fn test_membership_is_join_ordered() {
        let cluster = cluster();
        cluster.join("a");
        cluster.join("b");
        cluster.join("c");

        assert_eq!(
            cluster.members(),
            vec![Member::new("a"), Member::new("b"), Member::new("c")]
        );
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_registered_handler() {
        let _ = tracing_subscriber::fmt::try_init();

        let cluster = cluster();
        let a = cluster.join("a");
        let b = cluster.join("b");
        b.register_handler("svc", Arc::new(EchoHandler));

        let outcome = a
            .dispatcher("svc")
            .dispatch_to_member(b.member(), "ping".to_string())
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed("ping".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_to_departed_member_is_cancelled() {
        let cluster = cluster();
        let a = cluster.join("a");

        let outcome = a
            .dispatcher("svc")
            .dispatch_to_member(&Member::new("ghost"), "ping".to_string())
            .await
            .unwrap();
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_dispatch_without_handler_is_service_not_found() {
        let cluster = cluster();
        let a = cluster.join("a");
        let b = cluster.join("b");

        let result = a
            .dispatcher("svc")
            .dispatch_to_member(b.member(), "ping".to_string())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_registration_and_failure_notify_listeners() {
        let cluster = cluster();
        let a = cluster.join("a");
        let b = cluster.join("b");

        let listener = Arc::new(RecordingListener::default());
        let registration = a
            .registry()
            .register("svc".into(), listener.clone())
            .await
            .unwrap();
        b.registry()
            .register("svc".into(), Arc::new(RecordingListener::default()))
            .await
            .unwrap();

        cluster.fail(b.member()).await;

        let seen = listener.seen.lock().clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], HashSet::from([Member::new("a")]));
        assert_eq!(
            seen[1],
            HashSet::from([Member::new("a"), Member::new("b")])
        );
        assert_eq!(seen[2], HashSet::from([Member::new("a")]));

        registration.close().await.unwrap();
        assert!(cluster.providers(&"svc".into()).is_empty());
    }

    #[tokio::test]
    async fn test_rigged_response_overrides_handler() {
        let cluster = cluster();
        let a = cluster.join("a");
        let b = cluster.join("b");
        b.register_handler("svc", Arc::new(EchoHandler));
        cluster.rig_response("svc", b.member(), "rigged".to_string());

        let outcome = a
            .dispatcher("svc")
            .dispatch_to_member(b.member(), "ping".to_string())
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed("rigged".to_string()));
    }

    #[tokio::test]
    async fn test_rigged_cancellation() {
        let cluster = cluster();
        let a = cluster.join("a");
        let b = cluster.join("b");
        b.register_handler("svc", Arc::new(EchoHandler));
        cluster.rig_cancelled("svc", b.member());

        let outcome = a
            .dispatcher("svc")
            .dispatch_to_member(b.member(), "ping".to_string())
            .await
            .unwrap();
        assert!(outcome.is_cancelled());
    }
}
