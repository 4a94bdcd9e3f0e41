use std::{
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use shared::StatusRecord;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::ReceiverStream;

mod firebase;
mod memory;
mod sse;

pub use firebase::FirebaseStatusStore;
pub use memory::InMemoryStatusStore;

/// Pushes buffered per subscription before the reader task waits on the consumer.
pub const SUBSCRIPTION_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid database url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("store rejected the write: {0}")]
    Rejected(String),
    #[error("failed to encode status record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Realtime key-value store holding the single live status record.
///
/// `write` replaces the whole record. `subscribe` yields the value present at
/// subscribe time first and then every later value, in the store's delivery
/// order. Pushes are raw JSON; validating them is the subscriber's job.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn write(&self, record: &StatusRecord) -> Result<(), StoreError>;
    async fn subscribe(&self) -> Result<StatusSubscription, StoreError>;
}

/// Long-lived push subscription backed by a reader task.
///
/// Dropping the subscription cancels the reader.
pub struct StatusSubscription {
    pushes: ReceiverStream<Value>,
    reader: Option<JoinHandle<()>>,
}

impl StatusSubscription {
    pub fn new(pushes: mpsc::Receiver<Value>, reader: JoinHandle<()>) -> Self {
        Self {
            pushes: ReceiverStream::new(pushes),
            reader: Some(reader),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.pushes.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.reader.is_none()
    }
}

impl Stream for StatusSubscription {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.pushes).poll_next(cx)
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
