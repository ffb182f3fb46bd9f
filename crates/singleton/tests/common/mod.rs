//! Test cluster utilities for integration testing

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use soloist_cluster_memory::{
    MemoryCluster, MemoryDispatcher, MemoryMembershipView, MemoryProviderRegistry,
};
use soloist_membership::Member;
use soloist_singleton::{
    CommandResponse, ElectionListener, OldestMemberPolicy, SingletonCommand, SingletonConfig,
    SingletonCoordinator, SingletonService,
};

/// The singleton service name used throughout the scenario tests.
pub const SERVICE: &str = "cache-writer";

/// Memory cluster carrying the singleton command protocol.
pub type Cluster = MemoryCluster<SingletonCommand, CommandResponse>;

/// Coordinator wired to the in-memory collaborators.
pub type TestCoordinator = SingletonCoordinator<
    MemoryMembershipView<SingletonCommand, CommandResponse>,
    MemoryDispatcher<SingletonCommand, CommandResponse>,
    MemoryProviderRegistry<SingletonCommand, CommandResponse>,
    RecordingService,
>;

/// Singleton service recording its lifecycle transitions.
#[derive(Debug, Default)]
pub struct RecordingService {
    starts: AtomicUsize,
    stops: AtomicUsize,
    running: AtomicBool,
}

impl RecordingService {
    /// How many times the service was actually started.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// How many times the service was actually stopped.
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Whether the service is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SingletonService for RecordingService {
    fn name(&self) -> &str {
        "recording"
    }

    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Election listener recording every delivered outcome.
#[derive(Default)]
pub struct RecordingListener {
    outcomes: Mutex<Vec<(Vec<Member>, Option<Member>)>>,
}

impl RecordingListener {
    /// Every outcome delivered so far.
    pub fn outcomes(&self) -> Vec<(Vec<Member>, Option<Member>)> {
        self.outcomes.lock().clone()
    }

    /// The most recent outcome, if any.
    pub fn last(&self) -> Option<(Vec<Member>, Option<Member>)> {
        self.outcomes.lock().last().cloned()
    }
}

impl ElectionListener for RecordingListener {
    fn elected(&self, candidates: &[Member], elected: Option<&Member>) {
        self.outcomes
            .lock()
            .push((candidates.to_vec(), elected.cloned()));
    }
}

/// One cluster node: coordinator plus its observation points.
pub struct TestNode {
    pub member: Member,
    pub coordinator: TestCoordinator,
    pub service: Arc<RecordingService>,
    pub listener: Arc<RecordingListener>,
}

/// Join the cluster as `name`, wire a coordinator to the in-memory
/// collaborators, and register it as a provider. The returned node is fully
/// participating in elections.
pub async fn spawn_node(cluster: &Cluster, name: &str, quorum: usize) -> TestNode {
    let handle = cluster.join(name);
    let service = Arc::new(RecordingService::default());
    let listener = Arc::new(RecordingListener::default());

    let config = SingletonConfig::new(SERVICE)
        .with_quorum(quorum)
        .expect("valid quorum");

    let coordinator = SingletonCoordinator::new(
        config,
        Arc::new(handle.view()),
        Arc::new(handle.dispatcher(SERVICE)),
        Arc::new(handle.registry()),
        service.clone(),
        Arc::new(OldestMemberPolicy),
    );
    coordinator.subscribe(listener.clone());

    // Inbound commands must be routable before the first election runs.
    handle.register_handler(SERVICE, Arc::new(coordinator.clone()));
    coordinator.start().await.expect("coordinator start");

    TestNode {
        member: handle.member().clone(),
        coordinator,
        service,
        listener,
    }
}

/// How many of the given nodes currently consider themselves primary.
pub fn primary_count(nodes: &[&TestNode]) -> usize {
    nodes
        .iter()
        .filter(|node| node.coordinator.is_primary())
        .count()
}
