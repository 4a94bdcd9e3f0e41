//! Manager-side status changes: compose, apply locally, write remotely.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use chrono::Utc;
use message_composer::MessageComposer;
use shared::{OfficeStatus, StatusRecord};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{connection::StoreConnection, view::StatusView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a status change is already in progress")]
    ChangeInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub current_status: OfficeStatus,
    pub pending_context: String,
    pub is_composing: bool,
    pub last_updated_at: i64,
}

struct ControllerState {
    current_status: OfficeStatus,
    pending_context: String,
    last_updated_at: i64,
}

pub struct StatusController {
    composer: MessageComposer,
    connection: Arc<StoreConnection>,
    view: StatusView,
    state: Mutex<ControllerState>,
    composing: AtomicBool,
}

/// Clears the busy flag when the change finishes or its future is dropped.
struct ComposingGuard<'a>(&'a AtomicBool);

impl Drop for ComposingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Wall clock, but never at or behind the previous record.
fn next_timestamp(now: i64, previous: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

impl StatusController {
    pub fn new(composer: MessageComposer, connection: Arc<StoreConnection>, view: StatusView) -> Self {
        let current = view.current();
        Self {
            composer,
            connection,
            view,
            state: Mutex::new(ControllerState {
                current_status: current.status,
                pending_context: String::new(),
                last_updated_at: current.timestamp,
            }),
            composing: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> &StatusView {
        &self.view
    }

    pub fn is_composing(&self) -> bool {
        self.composing.load(Ordering::SeqCst)
    }

    pub fn set_context(&self, context: impl Into<String>) {
        self.state().pending_context = context.into();
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.state();
        ControllerSnapshot {
            current_status: state.current_status,
            pending_context: state.pending_context.clone(),
            is_composing: self.is_composing(),
            last_updated_at: state.last_updated_at,
        }
    }

    /// Follows a record pushed by the store. While a change is being composed
    /// the optimistic status is kept until that change completes.
    pub fn observe(&self, record: &StatusRecord) {
        if self.is_composing() {
            return;
        }
        let mut state = self.state();
        state.current_status = record.status;
        state.last_updated_at = record.timestamp;
    }

    /// Runs one status change end to end and returns the record applied locally.
    ///
    /// Rejected while another change is composing. Store write failures are
    /// logged only; the optimistic local record stands until a later push.
    pub async fn request_status_change(
        &self,
        new_status: OfficeStatus,
    ) -> Result<StatusRecord, ControllerError> {
        if self
            .composing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(requested = %new_status, "controller: change rejected, composition in progress");
            return Err(ControllerError::ChangeInProgress);
        }
        let _guard = ComposingGuard(&self.composing);

        let context = {
            let mut state = self.state();
            state.current_status = new_status;
            state.pending_context.clone()
        };

        let message = self.composer.compose(new_status, &context).await;

        let previous = self.state().last_updated_at.max(self.view.current().timestamp);
        let timestamp = next_timestamp(now_millis(), previous);
        let custom_context = Some(context.trim().to_string()).filter(|c| !c.is_empty());
        let record = StatusRecord::new(new_status, message, timestamp, custom_context);

        self.view.apply(record.clone());
        match self.connection.store().await {
            Ok(store) => {
                if let Err(err) = store.write(&record).await {
                    error!(status = %new_status, "controller: failed to update remote status: {err}");
                }
            }
            Err(err) => error!(status = %new_status, "controller: failed to update remote status: {err}"),
        }

        {
            let mut state = self.state();
            // Context typed while composing belongs to the next change.
            if state.pending_context == context {
                state.pending_context.clear();
            }
            state.last_updated_at = timestamp;
        }
        info!(status = %new_status, timestamp, "controller: status changed");
        Ok(record)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
