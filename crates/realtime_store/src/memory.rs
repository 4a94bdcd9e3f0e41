//! Process-local store with the same write/subscribe contract as the remote one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use shared::StatusRecord;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::warn;

use crate::{StatusStore, StatusSubscription, StoreError, SUBSCRIPTION_BUFFER};

pub struct InMemoryStatusStore {
    current: Mutex<Value>,
    events: broadcast::Sender<Value>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            current: Mutex::new(Value::Null),
            events,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Replaces the stored value with arbitrary JSON, bypassing record encoding.
    pub async fn put_raw(&self, value: Value) {
        let mut current = self.current.lock().await;
        *current = value.clone();
        let _ = self.events.send(value);
    }

    pub async fn current(&self) -> Value {
        self.current.lock().await.clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn write(&self, record: &StatusRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("in-memory store is failing writes".into()));
        }
        let value = serde_json::to_value(record)?;
        self.put_raw(value).await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self) -> Result<StatusSubscription, StoreError> {
        // Snapshot and receiver are taken under the same lock so no write falls between them.
        let (initial, mut updates) = {
            let current = self.current.lock().await;
            (current.clone(), self.events.subscribe())
        };

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let reader = tokio::spawn(async move {
            if tx.send(initial).await.is_err() {
                return;
            }
            loop {
                match updates.recv().await {
                    Ok(value) => {
                        if tx.send(value).await.is_err() {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "store: in-memory subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });

        Ok(StatusSubscription::new(rx, reader))
    }
}
