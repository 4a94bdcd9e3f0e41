use std::sync::Arc;

use shared::StatusRecord;
use tokio::sync::watch;

/// Local view of the shared status record.
///
/// Updates replace the whole record, so readers never see a mix of two
/// records. The view may run ahead of the store after an optimistic apply
/// until the next push arrives.
#[derive(Clone)]
pub struct StatusView {
    current: Arc<watch::Sender<StatusRecord>>,
}

impl StatusView {
    pub fn new(initial: StatusRecord) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current: Arc::new(current),
        }
    }

    pub fn current(&self) -> StatusRecord {
        self.current.borrow().clone()
    }

    pub fn apply(&self, record: StatusRecord) {
        self.current.send_replace(record);
    }

    pub fn changes(&self) -> watch::Receiver<StatusRecord> {
        self.current.subscribe()
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self::new(StatusRecord::initial())
    }
}
