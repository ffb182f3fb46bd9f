//! The start/stop capability wrapped by a coordinator

use async_trait::async_trait;

/// The service whose single cluster-wide instance is being coordinated.
///
/// Implementations are invoked only on actual lifecycle transitions; the
/// coordinator absorbs duplicate Start/Stop commands before they reach this
/// trait.
#[async_trait]
pub trait SingletonService
where
    Self: Send + Sync + 'static,
{
    /// Get the name of the service, for logging.
    fn name(&self) -> &str;

    /// Start the service on the local member.
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Stop the service on the local member.
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
