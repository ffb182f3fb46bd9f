//! Election outcome listeners

use tracing::info;

use soloist_membership::{Member, ServiceId};

/// Notified of each election's candidate list and outcome.
///
/// Listeners run on every member (delivered through the outcome broadcast),
/// not just the member that drove the election, so operators can observe
/// singleton ownership from any node's log.
pub trait ElectionListener
where
    Self: Send + Sync + 'static,
{
    /// Called once per election with the ordered candidate list and the
    /// elected member, or `None` when no member was elected.
    fn elected(&self, candidates: &[Member], elected: Option<&Member>);
}

/// Default listener logging election outcomes.
#[derive(Debug, Clone)]
pub struct LoggingElectionListener {
    service: ServiceId,
}

impl LoggingElectionListener {
    /// Create a logging listener for `service`.
    pub fn new(service: impl Into<ServiceId>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl ElectionListener for LoggingElectionListener {
    fn elected(&self, candidates: &[Member], elected: Option<&Member>) {
        match elected {
            Some(member) => info!(
                service = %self.service,
                primary = %member,
                candidates = candidates.len(),
                "elected primary provider"
            ),
            None => info!(
                service = %self.service,
                candidates = candidates.len(),
                "no primary provider elected"
            ),
        }
    }
}
