//! Abstract interface for per-service provider registration.
//!
//! A provider registry tracks, per singleton service, which members currently
//! advertise themselves as potential hosts of that service, and notifies a
//! registered listener whenever that set changes.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use soloist_membership::{Member, ServiceId};

/// Marker trait for `ProviderRegistry` errors
pub trait ProviderRegistryError: Debug + Error + Send + Sync + 'static {}

/// Listener invoked whenever the provider set of a service changes.
///
/// Implementations must tolerate being handed the same set twice; the
/// registry guarantees serialized delivery (no overlapping invocations for
/// the same listener instance) but not deduplication.
#[async_trait]
pub trait ProviderListener
where
    Self: Send + Sync + 'static,
{
    /// Called with the complete new provider set after every change
    /// (member registered, deregistered, or departed).
    async fn on_providers_changed(&self, providers: HashSet<Member>);
}

/// Handle representing an active provider registration.
#[async_trait]
pub trait Registration
where
    Self: Send + Sync + 'static,
{
    /// Deregister the local member as a provider. Idempotent.
    async fn close(&self) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// A trait representing the provider-set collaborator for singleton services.
#[async_trait]
pub trait ProviderRegistry
where
    Self: Send + Sync + 'static,
{
    /// The error type for registry operations.
    type Error: ProviderRegistryError;

    /// The registration handle type returned by [`Self::register`].
    type Registration: Registration;

    /// Register the local member as a provider of `service` and subscribe
    /// `listener` to provider-set changes. The listener is notified of the
    /// resulting set before this call returns.
    async fn register(
        &self,
        service: ServiceId,
        listener: Arc<dyn ProviderListener>,
    ) -> Result<Self::Registration, Self::Error>;
}
