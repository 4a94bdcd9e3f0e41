use futures::StreamExt;
use shared::StatusRecord;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::connection::StoreConnection;

/// Keeps a client's local view in step with the store.
pub struct StatusSubscriber;

pub struct SubscriberHandle {
    task: Option<JoinHandle<()>>,
}

impl SubscriberHandle {
    fn inactive() -> Self {
        Self { task: None }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl StatusSubscriber {
    /// Subscribes once and calls `on_change` with every valid record the store
    /// pushes, starting with the current one. Invalid pushes are skipped.
    ///
    /// A store that cannot be reached yields an inactive handle; the caller
    /// keeps its last known state.
    pub async fn start<F>(connection: &StoreConnection, mut on_change: F) -> SubscriberHandle
    where
        F: FnMut(StatusRecord) + Send + 'static,
    {
        let store = match connection.store().await {
            Ok(store) => store,
            Err(err) => {
                warn!("subscriber: not subscribing: {err}");
                return SubscriberHandle::inactive();
            }
        };
        let mut subscription = match store.subscribe().await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!("subscriber: subscribe failed: {err}");
                return SubscriberHandle::inactive();
            }
        };

        let task = tokio::spawn(async move {
            while let Some(push) = subscription.next().await {
                match StatusRecord::from_push(&push) {
                    Ok(record) => on_change(record),
                    Err(err) => debug!("subscriber: ignoring push: {err}"),
                }
            }
            debug!("subscriber: subscription ended");
        });

        SubscriberHandle { task: Some(task) }
    }
}

#[cfg(test)]
#[path = "tests/subscriber_tests.rs"]
mod tests;
