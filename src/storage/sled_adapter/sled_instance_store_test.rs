use tempfile::TempDir;

use super::SledInstanceStore;
use crate::InstanceConfigRecord;
use crate::InstanceStore;

fn setup(tmp: &TempDir) -> SledInstanceStore {
    let db = sled::Config::default()
        .path(tmp.path().join("instances"))
        .open()
        .expect("Should succeed to open test db");
    SledInstanceStore::new(db).expect("Should succeed to open instance trees")
}

fn sample_record(instance_id: u64) -> InstanceConfigRecord {
    InstanceConfigRecord {
        instance_id,
        config_app_id: "app1".to_string(),
        config_cluster_name: "default".to_string(),
        config_namespace_name: "ns1".to_string(),
        release_key: "release-1".to_string(),
        release_delivery_time: 1000,
        created_time: 1000,
        last_modified_time: 1000,
    }
}

// Case 1: create-then-find round-trips the identity; a second create of
// the same tuple fails with a constraint violation
#[tokio::test]
async fn test_create_instance_unique_per_tuple() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = setup(&tmp);

    let created = store
        .create_instance("app1", "cluster1", "dc1", "10.0.0.1")
        .await
        .expect("create");
    assert!(created.id >= 1);

    let found = store
        .find_instance("app1", "cluster1", "dc1", "10.0.0.1")
        .await
        .expect("find")
        .expect("identity should exist");
    assert_eq!(found, created);

    let duplicate = store
        .create_instance("app1", "cluster1", "dc1", "10.0.0.1")
        .await;
    assert!(duplicate.expect_err("duplicate tuple").is_constraint_violation());
}

// Case 2: an empty data center is part of the identity, distinct from a
// named one
#[tokio::test]
async fn test_instance_identity_distinguishes_data_center() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = setup(&tmp);

    let with_dc = store
        .create_instance("app1", "cluster1", "dc1", "10.0.0.1")
        .await
        .expect("create");
    let without_dc = store
        .create_instance("app1", "cluster1", "", "10.0.0.1")
        .await
        .expect("create");
    assert_ne!(with_dc.id, without_dc.id);

    assert!(store
        .find_instance("app1", "cluster1", "", "10.0.0.1")
        .await
        .expect("find")
        .is_some());
}

// Case 3: instance-config create is unique per
// (instance, configApp, configNamespace); update overwrites in place
#[tokio::test]
async fn test_instance_config_create_and_update() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = setup(&tmp);

    let record = sample_record(7);
    store.create_instance_config(&record).await.expect("create");

    let duplicate = store.create_instance_config(&record).await;
    assert!(duplicate.expect_err("duplicate key").is_constraint_violation());

    let mut updated = record.clone();
    updated.release_key = "release-2".to_string();
    updated.last_modified_time = 2000;
    store.update_instance_config(&updated).await.expect("update");

    let found = store
        .find_instance_config(7, "app1", "ns1")
        .await
        .expect("find")
        .expect("record should exist");
    assert_eq!(found.release_key, "release-2");
    assert_eq!(found.last_modified_time, 2000);
    assert_eq!(found.created_time, record.created_time);
}
