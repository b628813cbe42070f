use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::ReleaseMessageProducer;
use crate::constants::RELEASE_MESSAGE_CHANNEL;
use crate::test_utils;
use crate::ChannelConfig;
use crate::MockMessageLogStore;
use crate::ReleaseMessage;
use crate::StorageError;

fn message(id: u64, payload: &str) -> ReleaseMessage {
    ReleaseMessage {
        id,
        channel: RELEASE_MESSAGE_CHANNEL.to_string(),
        payload: payload.to_string(),
        created_at: 1000,
    }
}

// Case 1: a send on the release channel persists the message and succeeds
//
// ## Criterias:
// - store insert invoked once
// - send returns Ok
#[tokio::test]
async fn test_send_persists_message() {
    test_utils::enable_logger();

    let mut mock_store = MockMessageLogStore::new();
    mock_store.expect_insert().times(1).returning(|channel, payload| {
        Ok(ReleaseMessage {
            id: 1,
            channel: channel.to_string(),
            payload: payload.to_string(),
            created_at: 1000,
        })
    });

    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, _worker) =
        ReleaseMessageProducer::new(Arc::new(mock_store), &ChannelConfig::default(), shutdown_rx);

    producer
        .send("app1+default+ns1", RELEASE_MESSAGE_CHANNEL)
        .await
        .expect("Should succeed to send release message");
}

// Case 2: an unsupported channel is ignored without touching storage
#[tokio::test]
async fn test_send_rejects_unsupported_channel() {
    let mut mock_store = MockMessageLogStore::new();
    mock_store.expect_insert().times(0);

    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, _worker) =
        ReleaseMessageProducer::new(Arc::new(mock_store), &ChannelConfig::default(), shutdown_rx);

    producer
        .send("app1+default+ns1", "some-other-channel")
        .await
        .expect("Unsupported channel should be a logged no-op");
}

// Case 3: a storage failure surfaces to the caller so the release is not
// silently reported as sent
#[tokio::test]
async fn test_send_surfaces_persistence_failure() {
    let mut mock_store = MockMessageLogStore::new();
    mock_store
        .expect_insert()
        .times(1)
        .returning(|_, _| Err(StorageError::Persistence("db unavailable".to_string()).into()));

    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, _worker) =
        ReleaseMessageProducer::new(Arc::new(mock_store), &ChannelConfig::default(), shutdown_rx);

    let result = producer
        .send("app1+default+ns1", RELEASE_MESSAGE_CHANNEL)
        .await;
    assert!(result.is_err());
}

// Case 4: the retention worker re-reads the message and deletes older
// duplicates in batches until a short batch is returned
//
// ## Setup:
// - retention_batch_size = 2
// - first delete_batch returns a full batch, second returns a short one
//
// ## Criterias:
// - delete_batch invoked twice
#[tokio::test]
async fn test_retention_deletes_until_short_batch() {
    let config = ChannelConfig {
        retention_batch_size: 2,
        ..ChannelConfig::default()
    };

    let mut mock_store = MockMessageLogStore::new();
    mock_store
        .expect_insert()
        .times(1)
        .returning(|_, payload| Ok(message(10, payload)));
    mock_store
        .expect_find_by_id()
        .times(1)
        .returning(|id| Ok(Some(message(id, "app1+default+ns1"))));

    let delete_calls = Arc::new(AtomicU64::new(0));
    let delete_calls_clone = delete_calls.clone();
    mock_store
        .expect_delete_batch()
        .times(2)
        .returning(move |payload, _, _| {
            if delete_calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![message(1, payload), message(2, payload)])
            } else {
                Ok(vec![message(3, payload)])
            }
        });

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, worker) =
        ReleaseMessageProducer::new(Arc::new(mock_store), &config, shutdown_rx);
    let handle = tokio::spawn(worker.run());

    producer
        .send("app1+default+ns1", RELEASE_MESSAGE_CHANNEL)
        .await
        .expect("Should succeed to send release message");

    // give the worker a moment to drain, then stop it
    time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).expect("Should succeed to signal shutdown");
    handle
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
}

// Case 5: a message missing on re-read (rolled back or already cleaned)
// skips deletion entirely
#[tokio::test]
async fn test_retention_double_checks_message() {
    let mut mock_store = MockMessageLogStore::new();
    mock_store
        .expect_insert()
        .times(1)
        .returning(|_, payload| Ok(message(10, payload)));
    mock_store.expect_find_by_id().times(1).returning(|_| Ok(None));
    mock_store.expect_delete_batch().times(0);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, worker) = ReleaseMessageProducer::new(
        Arc::new(mock_store),
        &ChannelConfig::default(),
        shutdown_rx,
    );
    let handle = tokio::spawn(worker.run());

    producer
        .send("app1+default+ns1", RELEASE_MESSAGE_CHANNEL)
        .await
        .expect("Should succeed to send release message");

    time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(()).expect("Should succeed to signal shutdown");
    handle
        .await
        .expect("worker task should join")
        .expect("worker should exit cleanly");
}

// Case 6: with no worker draining, a full retention queue never blocks or
// fails the producer
#[tokio::test]
async fn test_full_retention_queue_drops_silently() {
    let config = ChannelConfig {
        retention_queue_size: 1,
        ..ChannelConfig::default()
    };

    let mut mock_store = MockMessageLogStore::new();
    let next_id = AtomicU64::new(1);
    mock_store.expect_insert().times(5).returning(move |_, payload| {
        Ok(message(next_id.fetch_add(1, Ordering::SeqCst), payload))
    });

    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    let (producer, _worker) = ReleaseMessageProducer::new(Arc::new(mock_store), &config, shutdown_rx);

    for _ in 0..5 {
        producer
            .send("app1+default+ns1", RELEASE_MESSAGE_CHANNEL)
            .await
            .expect("Send should stay non-blocking when the queue is full");
    }
}
