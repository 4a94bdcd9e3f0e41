use super::*;
use std::{sync::Arc, time::Duration};

use realtime_store::{InMemoryStatusStore, StatusStore};
use serde_json::json;
use shared::OfficeStatus;
use tokio::sync::mpsc;

async fn recv(rx: &mut mpsc::UnboundedReceiver<StatusRecord>) -> StatusRecord {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("record in time")
        .expect("channel open")
}

async fn start_collecting(
    connection: &StoreConnection,
) -> (SubscriberHandle, mpsc::UnboundedReceiver<StatusRecord>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = StatusSubscriber::start(connection, move |record| {
        let _ = tx.send(record);
    })
    .await;
    (handle, rx)
}

#[tokio::test]
async fn delivers_current_record_then_later_writes() {
    let store = Arc::new(InMemoryStatusStore::new());
    let existing = StatusRecord::new(OfficeStatus::Prayer, "p", 10, None);
    store.write(&existing).await.expect("write");
    let connection = StoreConnection::with_store(store.clone());

    let (handle, mut rx) = start_collecting(&connection).await;
    assert!(handle.is_active());
    assert_eq!(recv(&mut rx).await, existing);

    let next = StatusRecord::new(OfficeStatus::Available, "a", 11, Some("ctx".into()));
    store.write(&next).await.expect("write");
    assert_eq!(recv(&mut rx).await, next);
}

#[tokio::test]
async fn malformed_pushes_are_skipped() {
    let store = Arc::new(InMemoryStatusStore::new());
    let connection = StoreConnection::with_store(store.clone());
    let (_handle, mut rx) = start_collecting(&connection).await;

    store.put_raw(json!({"status": "ON_LEAVE", "message": "x", "timestamp": 1})).await;
    store.put_raw(json!({"message": "no status", "timestamp": 2})).await;
    store.put_raw(json!("just text")).await;
    let valid = StatusRecord::new(OfficeStatus::Busy, "b", 3, None);
    store.write(&valid).await.expect("write");

    // The never-written null and the three malformed payloads produce nothing.
    assert_eq!(recv(&mut rx).await, valid);
}

#[tokio::test]
async fn unconnected_store_gives_inactive_handle() {
    let connection = StoreConnection::firebase("officeStatus");
    let (handle, _rx) = start_collecting(&connection).await;
    assert!(!handle.is_active());
}

#[tokio::test]
async fn cancel_stops_delivery() {
    let store = Arc::new(InMemoryStatusStore::new());
    let connection = StoreConnection::with_store(store.clone());
    let (mut handle, mut rx) = start_collecting(&connection).await;

    handle.cancel();
    assert!(!handle.is_active());
    store
        .write(&StatusRecord::new(OfficeStatus::Closed, "c", 5, None))
        .await
        .expect("write");

    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("channel closes once the task is gone");
    assert!(next.is_none());
}
