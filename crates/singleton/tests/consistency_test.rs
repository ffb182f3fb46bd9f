//! State-query consistency checks

mod common;

use assert_matches::assert_matches;

use common::{Cluster, SERVICE, spawn_node};
use soloist_singleton::{CommandResponse, SingletonError};

#[tokio::test]
async fn test_duplicate_primary_claims_are_reported() {
    let _ = tracing_subscriber::fmt::try_init();

    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;
    let b = spawn_node(&cluster, "b", 1).await;
    let c = spawn_node(&cluster, "c", 1).await;
    assert!(a.coordinator.is_primary());

    // Rig a second affirmative probe answer. The query must surface the
    // violation instead of picking one claimant.
    cluster.rig_response(SERVICE, &b.member, CommandResponse::Primary(true));

    let error = c.coordinator.singleton_state().await.unwrap_err();
    assert_matches!(
        error,
        SingletonError::ConsistencyViolation { claimants, .. } if claimants.len() == 2
    );
}

#[tokio::test]
async fn test_no_primary_is_a_distinct_retryable_error() {
    let cluster = Cluster::new();

    // Quorum two with a single provider: stopped everywhere.
    let a = spawn_node(&cluster, "a", 2).await;
    assert!(!a.coordinator.is_primary());

    let state = a.coordinator.singleton_state().await.unwrap();
    assert_eq!(state.primary, None);

    let error = a.coordinator.primary_member().await.unwrap_err();
    assert_matches!(error, SingletonError::NoPrimary(service) if service.name() == SERVICE);
}
