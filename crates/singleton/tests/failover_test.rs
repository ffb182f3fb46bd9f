//! End-to-end failover scenarios on a three-node memory cluster

mod common;

use common::{Cluster, SERVICE, primary_count, spawn_node};

#[tokio::test]
async fn test_oldest_member_becomes_primary() {
    let _ = tracing_subscriber::fmt::try_init();

    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;
    let b = spawn_node(&cluster, "b", 1).await;
    let c = spawn_node(&cluster, "c", 1).await;

    assert!(a.coordinator.is_primary());
    assert!(!b.coordinator.is_primary());
    assert!(!c.coordinator.is_primary());

    assert_eq!(a.service.starts(), 1);
    assert_eq!(b.service.starts(), 0);
    assert_eq!(c.service.starts(), 0);

    // Any member's state query names the same primary.
    let state = c.coordinator.singleton_state().await.unwrap();
    assert!(!state.local_primary);
    assert_eq!(state.primary, Some(a.member.clone()));
    assert_eq!(state.providers.len(), 3);
}

#[tokio::test]
async fn test_failover_elects_next_oldest_member() {
    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;
    let b = spawn_node(&cluster, "b", 1).await;
    let c = spawn_node(&cluster, "c", 1).await;

    cluster.fail(&a.member).await;

    assert!(b.coordinator.is_primary());
    assert!(!c.coordinator.is_primary());
    assert_eq!(primary_count(&[&b, &c]), 1);

    // Every remaining member's listener observed the new outcome.
    for node in [&b, &c] {
        let (candidates, elected) = node.listener.last().unwrap();
        assert_eq!(candidates, vec![b.member.clone(), c.member.clone()]);
        assert_eq!(elected, Some(b.member.clone()));
    }

    assert_eq!(b.coordinator.last_known_primary(), Some(b.member.clone()));
    assert_eq!(c.coordinator.last_known_primary(), Some(b.member.clone()));
}

#[tokio::test]
async fn test_graceful_shutdown_hands_over_primacy() {
    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;
    let b = spawn_node(&cluster, "b", 1).await;

    assert!(a.coordinator.is_primary());

    a.coordinator.shutdown().await.unwrap();

    // The member is still in the group, only its provider registration is
    // gone; the remaining provider takes over.
    assert!(!a.coordinator.is_primary());
    assert!(b.coordinator.is_primary());
    assert_eq!(a.service.stops(), 1);

    let state = a.coordinator.singleton_state().await.unwrap();
    assert_eq!(state.primary, Some(b.member.clone()));
}

#[tokio::test]
async fn test_at_most_one_primary_through_churn() {
    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;
    let b = spawn_node(&cluster, "b", 1).await;
    let c = spawn_node(&cluster, "c", 1).await;
    assert_eq!(primary_count(&[&a, &b, &c]), 1);

    cluster.fail(&a.member).await;
    assert_eq!(primary_count(&[&b, &c]), 1);
    assert!(b.coordinator.is_primary());

    cluster.fail(&b.member).await;
    assert_eq!(primary_count(&[&c]), 1);
    assert!(c.coordinator.is_primary());

    let d = spawn_node(&cluster, "d", 1).await;
    assert_eq!(primary_count(&[&c, &d]), 1);
    assert!(c.coordinator.is_primary(), "oldest survivor keeps primacy");
    assert_eq!(d.service.starts(), 0);
}

#[tokio::test]
async fn test_start_is_idempotent_per_coordinator() {
    let cluster = Cluster::new();
    let a = spawn_node(&cluster, "a", 1).await;

    a.coordinator.start().await.unwrap();
    a.coordinator.start().await.unwrap();

    assert_eq!(a.service.starts(), 1);
    assert_eq!(cluster.providers(&SERVICE.into()).len(), 1);
}
