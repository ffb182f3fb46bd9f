//! In-memory command dispatcher

use std::fmt::Debug;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::trace;

use soloist_dispatch::{CommandDispatcher, DispatchOutcome, MemberResult};
use soloist_membership::{Member, ServiceId};

use crate::cluster::{CommandHandlerRef, DispatchRecord, MemoryCluster};
use crate::error::MemoryDispatchError;

/// Per-member command dispatcher scoped to one service, backed by the
/// cluster hub's routing table.
pub struct MemoryDispatcher<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    service: ServiceId,
    local: Member,
    cluster: MemoryCluster<C, R>,
}

impl<C, R> MemoryDispatcher<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub(crate) const fn new(service: ServiceId, local: Member, cluster: MemoryCluster<C, R>) -> Self {
        Self {
            service,
            local,
            cluster,
        }
    }
}

enum Route<R, H> {
    Cancelled,
    Rigged(R),
    Handler(H),
    NotFound,
}

#[async_trait]
impl<C, R> CommandDispatcher for MemoryDispatcher<C, R>
where
    C: Debug + Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Command = C;
    type Response = R;
    type Error = MemoryDispatchError;

    async fn dispatch_to_member(
        &self,
        member: &Member,
        command: C,
    ) -> Result<DispatchOutcome<R>, MemoryDispatchError> {
        let key = (self.service.clone(), member.clone());

        let route = {
            let mut state = self.cluster.inner.state.lock();
            state.dispatch_log.push(DispatchRecord {
                origin: self.local.clone(),
                target: member.clone(),
                command: format!("{command:?}"),
            });

            if !state.members.contains(member) || state.rigged_cancels.contains(&key) {
                Route::Cancelled
            } else if let Some(response) = state.rigged_responses.get(&key) {
                Route::Rigged(response.clone())
            } else {
                self.cluster.inner.handlers.get(&key).map_or(Route::NotFound, |handler| {
                    Route::Handler(CommandHandlerRef::clone(handler.value()))
                })
            }
        };

        match route {
            Route::Cancelled => {
                trace!(
                    service = %self.service,
                    %member,
                    "dispatch cancelled, member not reachable"
                );
                Ok(DispatchOutcome::Cancelled)
            }
            Route::Rigged(response) => Ok(DispatchOutcome::Completed(response)),
            Route::Handler(handler) => handler
                .handle(command)
                .await
                .map(DispatchOutcome::Completed)
                .map_err(|e| MemoryDispatchError::Handler {
                    member: member.clone(),
                    message: e.to_string(),
                }),
            Route::NotFound => Err(MemoryDispatchError::ServiceNotFound {
                service: self.service.clone(),
                member: member.clone(),
            }),
        }
    }

    async fn dispatch_to_group(
        &self,
        command: C,
    ) -> Result<Vec<MemberResult<R, MemoryDispatchError>>, MemoryDispatchError> {
        let members = self.cluster.members();

        let sends = members.into_iter().map(|member| {
            let command = command.clone();
            async move {
                let result = self.dispatch_to_member(&member, command).await;
                (member, result)
            }
        });

        Ok(join_all(sends).await)
    }
}
