//! Per-node singleton coordinator
//!
//! Each node runs one coordinator per singleton service. The coordinator
//! registers the local member as a provider, reacts to provider-set changes
//! by running the election, and executes inbound Start/Stop/Query commands
//! against the local lifecycle state.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use soloist_dispatch::{CommandDispatcher, CommandHandler, DispatchError, DispatchOutcome};
use soloist_membership::{Member, MembershipView, ServiceId};
use soloist_registry::{ProviderListener, ProviderRegistry, Registration};

use crate::command::{CommandResponse, SingletonCommand};
use crate::config::SingletonConfig;
use crate::election::{ElectionOutcome, ElectionPolicy};
use crate::error::SingletonError;
use crate::listener::{ElectionListener, LoggingElectionListener};
use crate::primary_cell::PrimaryCell;
use crate::service::SingletonService;
use crate::state::{ServiceStatus, SingletonState, StatusCell};

struct Inner<V, D, R, S>
where
    R: ProviderRegistry,
{
    config: SingletonConfig,
    view: Arc<V>,
    dispatcher: Arc<D>,
    registry: Arc<R>,
    service: Arc<S>,
    policy: Arc<dyn ElectionPolicy>,
    listeners: RwLock<Vec<Arc<dyn ElectionListener>>>,
    status: StatusCell,
    primary: PrimaryCell,
    providers: RwLock<HashSet<Member>>,
    registration: Mutex<Option<R::Registration>>,
}

/// Coordinates a cluster-wide singleton service from the local node.
///
/// Cheap to clone; clones share all state.
pub struct SingletonCoordinator<V, D, R, S>
where
    V: MembershipView,
    D: CommandDispatcher<Command = SingletonCommand, Response = CommandResponse>,
    R: ProviderRegistry,
    S: SingletonService,
{
    inner: Arc<Inner<V, D, R, S>>,
}

impl<V, D, R, S> Clone for SingletonCoordinator<V, D, R, S>
where
    V: MembershipView,
    D: CommandDispatcher<Command = SingletonCommand, Response = CommandResponse>,
    R: ProviderRegistry,
    S: SingletonService,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, D, R, S> SingletonCoordinator<V, D, R, S>
where
    V: MembershipView,
    D: CommandDispatcher<Command = SingletonCommand, Response = CommandResponse>,
    R: ProviderRegistry,
    S: SingletonService,
{
    /// Create a coordinator for the configured service.
    ///
    /// A [`LoggingElectionListener`] is installed by default; additional
    /// listeners can be added with [`Self::subscribe`].
    pub fn new(
        config: SingletonConfig,
        view: Arc<V>,
        dispatcher: Arc<D>,
        registry: Arc<R>,
        service: Arc<S>,
        policy: Arc<dyn ElectionPolicy>,
    ) -> Self {
        let logging: Arc<dyn ElectionListener> =
            Arc::new(LoggingElectionListener::new(config.service().clone()));

        Self {
            inner: Arc::new(Inner {
                config,
                view,
                dispatcher,
                registry,
                service,
                policy,
                listeners: RwLock::new(vec![logging]),
                status: StatusCell::new(),
                primary: PrimaryCell::new(),
                providers: RwLock::new(HashSet::new()),
                registration: Mutex::new(None),
            }),
        }
    }

    /// Add an election listener. Listeners added after elections have run
    /// only observe subsequent outcomes.
    pub fn subscribe(&self, listener: Arc<dyn ElectionListener>) {
        self.inner.listeners.write().push(listener);
    }

    /// The identity of the coordinated service.
    #[must_use]
    pub fn service_id(&self) -> &ServiceId {
        self.inner.config.service()
    }

    /// Register the local member as a provider. Idempotent. Elections then
    /// drive the local service through dispatched commands.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::Registry`] if registration fails.
    pub async fn start(&self) -> Result<(), SingletonError> {
        let mut registration = self.inner.registration.lock().await;
        if registration.is_some() {
            debug!(service = %self.service_id(), "coordinator already started");
            return Ok(());
        }

        let listener: Arc<dyn ProviderListener> = Arc::new(self.clone());
        let handle = self
            .inner
            .registry
            .register(self.service_id().clone(), listener)
            .await
            .map_err(|e| SingletonError::Registry(e.to_string()))?;
        *registration = Some(handle);

        info!(
            service = %self.service_id(),
            member = %self.inner.view.local_member(),
            "registered as singleton provider"
        );
        Ok(())
    }

    /// Stop the local service if it is running, then deregister the local
    /// member. Terminal state: stopped, registration closed. Stopping first
    /// keeps the local service out of the overlap window while the
    /// departure-triggered election starts the successor.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::ServiceStop`] if the wrapped service fails
    /// to stop, or [`SingletonError::Registry`] if deregistration fails.
    pub async fn shutdown(&self) -> Result<(), SingletonError> {
        self.stop_service().await?;

        if let Some(registration) = self.inner.registration.lock().await.take() {
            registration
                .close()
                .await
                .map_err(|e| SingletonError::Registry(e.to_string()))?;
            info!(service = %self.service_id(), "deregistered singleton provider");
        }

        Ok(())
    }

    /// Whether the local member is currently the elected primary with the
    /// wrapped service running.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.inner.status.load() == ServiceStatus::Started
    }

    /// The primary from the most recently delivered election outcome, or
    /// `None` when unknown or no member is elected.
    #[must_use]
    pub fn last_known_primary(&self) -> Option<Member> {
        self.inner.primary.get()
    }

    /// The provider set as of the latest registry event.
    #[must_use]
    pub fn providers(&self) -> HashSet<Member> {
        self.inner.providers.read().clone()
    }

    /// Probe the whole group and assemble a fresh cluster-wide snapshot.
    ///
    /// Blocks until every member's probe resolves; members that left or do
    /// not host the service are discarded from the result.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::ConsistencyViolation`] if more than one
    /// member answers the probe affirmatively, or
    /// [`SingletonError::Dispatch`] on unexpected dispatch failure.
    pub async fn singleton_state(&self) -> Result<SingletonState, SingletonError> {
        let results = self
            .inner
            .dispatcher
            .dispatch_to_group(SingletonCommand::QueryIsPrimary)
            .await
            .map_err(|e| SingletonError::Dispatch(e.to_string()))?;

        let mut claimants = Vec::new();
        for (member, result) in results {
            match result {
                Ok(DispatchOutcome::Completed(CommandResponse::Primary(true))) => {
                    claimants.push(member);
                }
                Ok(DispatchOutcome::Completed(_)) => {}
                Ok(DispatchOutcome::Cancelled) => {
                    trace!(service = %self.service_id(), %member, "primary probe cancelled");
                }
                Err(e) if e.kind().is_benign() => {
                    debug!(
                        service = %self.service_id(),
                        %member,
                        error = %e,
                        "primary probe not applicable"
                    );
                }
                Err(e) => return Err(SingletonError::Dispatch(e.to_string())),
            }
        }

        if claimants.len() > 1 {
            return Err(SingletonError::ConsistencyViolation {
                service: self.service_id().clone(),
                claimants,
            });
        }

        Ok(SingletonState {
            local_primary: self.is_primary(),
            primary: claimants.pop(),
            providers: self.providers(),
        })
    }

    /// The current primary member, determined by a fresh group probe.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::NoPrimary`] when no member responded as
    /// primary; callers may retry after the next election settles.
    pub async fn primary_member(&self) -> Result<Member, SingletonError> {
        self.singleton_state()
            .await?
            .primary
            .ok_or_else(|| SingletonError::NoPrimary(self.service_id().clone()))
    }

    /// Start the wrapped service if it is not already running. Invoked by
    /// inbound Start commands; duplicate starts collapse to no-ops.
    async fn start_service(&self) -> Result<(), SingletonError> {
        if !self
            .inner
            .status
            .transition(ServiceStatus::Stopped, ServiceStatus::Starting)
        {
            trace!(service = %self.service_id(), "start ignored, service not stopped");
            return Ok(());
        }

        match self.inner.service.start().await {
            Ok(()) => {
                self.inner.status.store(ServiceStatus::Started);
                info!(
                    service = %self.service_id(),
                    member = %self.inner.view.local_member(),
                    "started singleton service as primary"
                );
                Ok(())
            }
            Err(e) => {
                self.inner.status.store(ServiceStatus::Stopped);
                Err(SingletonError::ServiceStart(e))
            }
        }
    }

    /// Stop the wrapped service if it is running. Invoked by inbound Stop
    /// commands; stopping a stopped service is a no-op.
    async fn stop_service(&self) -> Result<(), SingletonError> {
        if !self
            .inner
            .status
            .transition(ServiceStatus::Started, ServiceStatus::Stopping)
        {
            trace!(service = %self.service_id(), "stop ignored, service not started");
            return Ok(());
        }

        match self.inner.service.stop().await {
            Ok(()) => {
                self.inner.status.store(ServiceStatus::Stopped);
                info!(
                    service = %self.service_id(),
                    member = %self.inner.view.local_member(),
                    "stopped singleton service"
                );
                Ok(())
            }
            Err(e) => {
                // The service is in an unknown state; report it stopped so a
                // later election can retry the start.
                self.inner.status.store(ServiceStatus::Stopped);
                Err(SingletonError::ServiceStop(e))
            }
        }
    }

    /// Run one election decision for the given provider set.
    async fn decide(&self, providers: &HashSet<Member>) -> Result<(), SingletonError> {
        let members = self.inner.view.members().await;
        let candidates: Vec<Member> = members
            .into_iter()
            .filter(|member| providers.contains(member))
            .collect();

        let local = self.inner.view.local_member();

        // Only the first candidate drives the election, so that a single
        // provider-set change does not produce one Start/Stop volley per
        // node. With no candidates left every node reports the outcome.
        if let Some(first) = candidates.first() {
            if first != local {
                trace!(
                    service = %self.service_id(),
                    elector = %first,
                    "not the electing member, skipping decision"
                );
                return Ok(());
            }
        }

        let quorum = self.inner.config.quorum();
        let quorum_met = candidates.len() >= quorum;

        if quorum_met && quorum > 1 && candidates.len() == quorum {
            warn!(
                service = %self.service_id(),
                quorum,
                "quorum exactly met, one more provider departure disables the service"
            );
        }

        let elected = if quorum_met {
            self.inner.policy.elect(&candidates)
        } else {
            info!(
                service = %self.service_id(),
                required = quorum,
                present = candidates.len(),
                "quorum not reached, stopping the service on all providers"
            );
            None
        };

        match &elected {
            Some(winner) => {
                info!(
                    service = %self.service_id(),
                    primary = %winner,
                    candidates = candidates.len(),
                    "elected primary provider"
                );

                // Losers are stopped, each awaited, before the winner is
                // started; within one decision at most one primary exists.
                for candidate in candidates.iter().filter(|c| *c != winner) {
                    self.send(candidate, SingletonCommand::Stop).await?;
                }
                self.send(winner, SingletonCommand::Start).await?;
            }
            None => {
                for candidate in &candidates {
                    self.send(candidate, SingletonCommand::Stop).await?;
                }
            }
        }

        let outcome = ElectionOutcome {
            candidates,
            elected,
        };
        self.broadcast(&outcome).await
    }

    /// Dispatch a command to one member, tolerating departure races.
    async fn send(&self, member: &Member, command: SingletonCommand) -> Result<(), SingletonError> {
        match self.inner.dispatcher.dispatch_to_member(member, command).await {
            Ok(DispatchOutcome::Completed(_)) => Ok(()),
            Ok(DispatchOutcome::Cancelled) => {
                trace!(
                    service = %self.service_id(),
                    %member,
                    "command cancelled, member left the group"
                );
                Ok(())
            }
            Err(e) if e.kind().is_benign() => {
                debug!(
                    service = %self.service_id(),
                    %member,
                    error = %e,
                    "benign dispatch failure, next membership change resolves it"
                );
                Ok(())
            }
            Err(e) => Err(SingletonError::Dispatch(e.to_string())),
        }
    }

    /// Broadcast the election outcome to every member's listeners.
    async fn broadcast(&self, outcome: &ElectionOutcome) -> Result<(), SingletonError> {
        let results = self
            .inner
            .dispatcher
            .dispatch_to_group(SingletonCommand::notify(outcome))
            .await
            .map_err(|e| SingletonError::Dispatch(e.to_string()))?;

        for (member, result) in results {
            match result {
                Ok(_) => {}
                Err(e) if e.kind().is_benign() => {
                    trace!(
                        service = %self.service_id(),
                        %member,
                        error = %e,
                        "election outcome not delivered"
                    );
                }
                Err(e) => return Err(SingletonError::Dispatch(e.to_string())),
            }
        }
        Ok(())
    }

    fn notify_listeners(&self, candidates: &[Member], elected: Option<&Member>) {
        let listeners = self.inner.listeners.read().clone();
        for listener in listeners {
            listener.elected(candidates, elected);
        }
    }
}

#[async_trait]
impl<V, D, R, S> ProviderListener for SingletonCoordinator<V, D, R, S>
where
    V: MembershipView,
    D: CommandDispatcher<Command = SingletonCommand, Response = CommandResponse>,
    R: ProviderRegistry,
    S: SingletonService,
{
    async fn on_providers_changed(&self, providers: HashSet<Member>) {
        debug!(
            service = %self.service_id(),
            providers = providers.len(),
            "provider set changed"
        );

        *self.inner.providers.write() = providers.clone();

        // No caller waits on the registry event path, so decision failures
        // surface in the log instead of propagating.
        if let Err(e) = self.decide(&providers).await {
            warn!(
                service = %self.service_id(),
                error = %e,
                "election decision failed"
            );
        }
    }
}

#[async_trait]
impl<V, D, R, S> CommandHandler for SingletonCoordinator<V, D, R, S>
where
    V: MembershipView,
    D: CommandDispatcher<Command = SingletonCommand, Response = CommandResponse>,
    R: ProviderRegistry,
    S: SingletonService,
{
    type Command = SingletonCommand;
    type Response = CommandResponse;

    async fn handle(
        &self,
        command: SingletonCommand,
    ) -> Result<CommandResponse, Box<dyn std::error::Error + Send + Sync>> {
        match command {
            SingletonCommand::Start => {
                self.start_service().await?;
                Ok(CommandResponse::Ack)
            }
            SingletonCommand::Stop => {
                self.stop_service().await?;
                Ok(CommandResponse::Ack)
            }
            SingletonCommand::QueryIsPrimary => Ok(CommandResponse::Primary(self.is_primary())),
            SingletonCommand::ElectionNotify {
                candidates,
                elected,
            } => {
                let elected = elected.and_then(|index| candidates.get(index)).cloned();
                self.inner.primary.set(elected.clone());
                self.notify_listeners(&candidates, elected.as_ref());
                Ok(CommandResponse::Ack)
            }
        }
    }
}
