//! End-to-end delivery audit over the embedded sled adapter: lazy identity
//! creation, idempotent upserts, create-race resolution and overflow.

use std::sync::Arc;
use std::time::Duration;

use conflux::init_sled_instance_db;
use conflux::AuditConfig;
use conflux::InstanceAuditor;
use conflux::InstanceStore;
use conflux::SledInstanceStore;
use tokio::sync::watch;
use tokio::time;

fn open_store(tmp: &tempfile::TempDir) -> Arc<SledInstanceStore> {
    let db = init_sled_instance_db(tmp.path()).expect("Should succeed to open db");
    Arc::new(SledInstanceStore::new(db).expect("Should succeed to open instance trees"))
}

// A first delivery observation materializes both the identity and its
// delivery record; a changed release key updates the record in place.
#[tokio::test]
async fn test_audit_creates_then_updates_record() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(&tmp);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (auditor, worker) =
        InstanceAuditor::new(store.clone(), &AuditConfig::default(), shutdown_rx);
    let handle = tokio::spawn(worker.run());

    assert!(auditor.record(
        "app1", "cluster1", "dc1", "10.0.0.1", "app1", "default", "ns1", "release-1",
    ));

    // identity created lazily
    let mut instance = None;
    for _ in 0..100 {
        instance = store
            .find_instance("app1", "cluster1", "dc1", "10.0.0.1")
            .await
            .expect("find instance");
        if instance.is_some() {
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    let instance = instance.expect("identity should have been created");

    let mut record = None;
    for _ in 0..100 {
        record = store
            .find_instance_config(instance.id, "app1", "ns1")
            .await
            .expect("find record");
        if record.is_some() {
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    let record = record.expect("delivery record should have been created");
    assert_eq!(record.release_key, "release-1");
    assert_eq!(record.created_time, record.last_modified_time);

    // a changed release key always produces a write
    assert!(auditor.record(
        "app1", "cluster1", "dc1", "10.0.0.1", "app1", "default", "ns1", "release-2",
    ));
    for _ in 0..100 {
        let updated = store
            .find_instance_config(instance.id, "app1", "ns1")
            .await
            .expect("find record")
            .expect("record exists");
        if updated.release_key == "release-2" {
            assert!(updated.release_delivery_time >= record.release_delivery_time);
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }

    shutdown_tx.send(()).expect("shutdown");
    handle
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
}

// Two auditors on the same store racing to create a brand-new identity end
// up with exactly one persisted row and no surfaced failure.
#[tokio::test]
async fn test_concurrent_identity_creation_yields_single_row() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(&tmp);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (auditor_a, worker_a) =
        InstanceAuditor::new(store.clone(), &AuditConfig::default(), shutdown_rx.clone());
    let (auditor_b, worker_b) =
        InstanceAuditor::new(store.clone(), &AuditConfig::default(), shutdown_rx);
    let handle_a = tokio::spawn(worker_a.run());
    let handle_b = tokio::spawn(worker_b.run());

    assert!(auditor_a.record(
        "app1", "cluster1", "", "10.0.0.9", "app1", "default", "ns1", "release-1",
    ));
    assert!(auditor_b.record(
        "app1", "cluster1", "", "10.0.0.9", "app1", "default", "ns1", "release-1",
    ));

    let mut instance = None;
    for _ in 0..100 {
        instance = store
            .find_instance("app1", "cluster1", "", "10.0.0.9")
            .await
            .expect("find instance");
        if instance.is_some() {
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    let instance = instance.expect("identity should exist");

    // both workers resolved to the same row; its record landed under that id
    let mut record = None;
    for _ in 0..100 {
        record = store
            .find_instance_config(instance.id, "app1", "ns1")
            .await
            .expect("find record");
        if record.is_some() {
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    assert!(record.is_some());

    shutdown_tx.send(()).expect("shutdown");
    handle_a
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
    handle_b
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
}

// Overflow drops events with `false` but never wedges the pipeline: once a
// worker drains the queue, later events flow again.
#[tokio::test]
async fn test_overflow_recovers_after_drain() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(&tmp);
    let config = AuditConfig {
        queue_size: 2,
        ..AuditConfig::default()
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (auditor, worker) = InstanceAuditor::new(store.clone(), &config, shutdown_rx);

    // no worker yet: the queue fills and further events are dropped
    let mut results = Vec::new();
    for i in 0..4 {
        results.push(auditor.record(
            "app1",
            "cluster1",
            "",
            &format!("10.0.1.{i}"),
            "app1",
            "default",
            "ns1",
            "release-1",
        ));
    }
    assert_eq!(results.iter().filter(|accepted| **accepted).count(), 2);
    assert_eq!(results.iter().filter(|accepted| !**accepted).count(), 2);

    let handle = tokio::spawn(worker.run());

    // the worker drains the backlog and the pipeline accepts events again
    let mut accepted_after_drain = false;
    for _ in 0..100 {
        if auditor.record(
            "app1", "cluster1", "", "10.0.2.1", "app1", "default", "ns1", "release-1",
        ) {
            accepted_after_drain = true;
            break;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    assert!(accepted_after_drain);

    shutdown_tx.send(()).expect("shutdown");
    handle
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
}
