use super::*;
use std::sync::atomic::AtomicUsize;

use async_trait::async_trait;
use message_composer::{GenerationBackend, GenerationError};
use realtime_store::InMemoryStatusStore;
use tokio::sync::Notify;

struct GatedBackend {
    reply: Option<&'static str>,
    calls: AtomicUsize,
    called: Notify,
    release: Notify,
}

impl GatedBackend {
    fn new(reply: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            called: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl GenerationBackend for GatedBackend {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<Option<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called.notify_one();
        self.release.notified().await;
        match self.reply {
            Some(text) => Ok(Some(text.to_string())),
            None => Err(GenerationError::Malformed("unreachable backend".into())),
        }
    }
}

struct EchoBackend;

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<Option<String>, GenerationError> {
        Ok(Some("  المدير في اجتماع، نعتذر عن الإزعاج  ".to_string()))
    }
}

fn memory_connection() -> (Arc<InMemoryStatusStore>, Arc<StoreConnection>) {
    let store = Arc::new(InMemoryStatusStore::new());
    let connection = Arc::new(StoreConnection::with_store(store.clone()));
    (store, connection)
}

fn controller_with(composer: MessageComposer) -> (Arc<InMemoryStatusStore>, Arc<StatusController>) {
    let (store, connection) = memory_connection();
    let controller = Arc::new(StatusController::new(
        composer,
        connection,
        StatusView::default(),
    ));
    (store, controller)
}

#[test]
fn next_timestamp_is_strictly_increasing() {
    assert_eq!(next_timestamp(100, 50), 100);
    assert_eq!(next_timestamp(100, 100), 101);
    assert_eq!(next_timestamp(90, 100), 101);
}

#[tokio::test]
async fn change_without_context_applies_default_and_writes_record() {
    let (store, controller) = controller_with(MessageComposer::offline());
    let before = controller.view().current();

    let record = controller
        .request_status_change(OfficeStatus::Closed)
        .await
        .expect("change");

    let view = controller.view().current();
    assert_eq!(view, record);
    assert_eq!(view.status, OfficeStatus::Closed);
    assert_eq!(view.message, OfficeStatus::Closed.default_message());
    assert!(view.timestamp > before.timestamp);
    assert_eq!(view.custom_context, None);
    assert_eq!(
        store.current().await,
        serde_json::to_value(&record).expect("encode")
    );

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.current_status, OfficeStatus::Closed);
    assert_eq!(snapshot.last_updated_at, record.timestamp);
    assert!(!snapshot.is_composing);
}

#[tokio::test]
async fn back_to_back_changes_get_increasing_timestamps() {
    let (_store, controller) = controller_with(MessageComposer::offline());
    let first = controller
        .request_status_change(OfficeStatus::Busy)
        .await
        .expect("first");
    let second = controller
        .request_status_change(OfficeStatus::Available)
        .await
        .expect("second");
    assert!(second.timestamp > first.timestamp);
}

#[tokio::test]
async fn context_is_composed_recorded_and_cleared() {
    let composer = MessageComposer::new(Arc::new(EchoBackend), "m");
    let (store, controller) = controller_with(composer);
    controller.set_context("اجتماع");

    let record = controller
        .request_status_change(OfficeStatus::Busy)
        .await
        .expect("change");

    assert_eq!(record.message, "المدير في اجتماع، نعتذر عن الإزعاج");
    assert_eq!(record.custom_context.as_deref(), Some("اجتماع"));
    assert_eq!(store.current().await["customContext"], "اجتماع");
    assert_eq!(controller.snapshot().pending_context, "");
}

#[tokio::test]
async fn second_request_while_composing_is_rejected_without_side_effects() {
    let backend = GatedBackend::new(Some("رسالة"));
    let composer = MessageComposer::new(backend.clone(), "m");
    let (store, controller) = controller_with(composer);
    controller.set_context("اجتماع");

    let in_flight = Arc::clone(&controller);
    let first = tokio::spawn(async move { in_flight.request_status_change(OfficeStatus::Busy).await });
    backend.called.notified().await;

    assert!(controller.is_composing());
    let snapshot_before = controller.snapshot();
    let view_before = controller.view().current();
    assert_eq!(snapshot_before.current_status, OfficeStatus::Busy);

    assert_eq!(
        controller.request_status_change(OfficeStatus::Closed).await,
        Err(ControllerError::ChangeInProgress)
    );
    assert_eq!(controller.snapshot(), snapshot_before);
    assert_eq!(controller.view().current(), view_before);
    assert_eq!(store.write_count(), 0);

    backend.release.notify_one();
    let record = first.await.expect("join").expect("change");
    assert_eq!(record.status, OfficeStatus::Busy);
    assert_eq!(record.message, "رسالة");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert!(!controller.is_composing());
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn dropped_change_releases_busy_flag() {
    let backend = GatedBackend::new(None);
    let composer = MessageComposer::new(backend.clone(), "m");
    let (_store, controller) = controller_with(composer);
    controller.set_context("x");

    let in_flight = Arc::clone(&controller);
    let first = tokio::spawn(async move { in_flight.request_status_change(OfficeStatus::Prayer).await });
    backend.called.notified().await;
    assert!(controller.is_composing());

    first.abort();
    let _ = first.await;
    assert!(!controller.is_composing());
    assert_eq!(controller.snapshot().pending_context, "x");
    assert_eq!(controller.view().current().status, OfficeStatus::Available);

    controller.set_context("");
    controller
        .request_status_change(OfficeStatus::Available)
        .await
        .expect("accepted after release");
}

#[tokio::test]
async fn context_typed_during_composition_survives_the_change() {
    let backend = GatedBackend::new(Some("رسالة"));
    let (_store, controller) = controller_with(MessageComposer::new(backend.clone(), "m"));
    controller.set_context("اجتماع");

    let in_flight = Arc::clone(&controller);
    let first = tokio::spawn(async move { in_flight.request_status_change(OfficeStatus::Busy).await });
    backend.called.notified().await;
    controller.set_context("صلاة العصر");

    backend.release.notify_one();
    let record = first.await.expect("join").expect("change");
    assert_eq!(record.custom_context.as_deref(), Some("اجتماع"));
    assert_eq!(controller.snapshot().pending_context, "صلاة العصر");
}

#[tokio::test]
async fn failed_write_keeps_optimistic_state() {
    let (store, controller) = controller_with(MessageComposer::offline());
    store.set_fail_writes(true);

    let record = controller
        .request_status_change(OfficeStatus::Busy)
        .await
        .expect("write failures are not surfaced");

    assert_eq!(controller.view().current(), record);
    assert!(store.current().await.is_null());
    assert!(!controller.is_composing());
}

#[tokio::test]
async fn closed_connection_still_updates_local_view() {
    let (_store, connection) = memory_connection();
    connection.reset().await;
    let controller = StatusController::new(
        MessageComposer::offline(),
        connection,
        StatusView::default(),
    );

    let record = controller
        .request_status_change(OfficeStatus::Prayer)
        .await
        .expect("change");
    assert_eq!(controller.view().current().status, OfficeStatus::Prayer);
    assert_eq!(record.message, OfficeStatus::Prayer.default_message());
}

#[tokio::test]
async fn observe_follows_pushes_unless_composing() {
    let backend = GatedBackend::new(Some("m"));
    let (_store, controller) = controller_with(MessageComposer::new(backend.clone(), "m"));

    let pushed = StatusRecord::new(OfficeStatus::Closed, "remote", 42, None);
    controller.observe(&pushed);
    assert_eq!(controller.snapshot().current_status, OfficeStatus::Closed);
    assert_eq!(controller.snapshot().last_updated_at, 42);

    controller.set_context("x");
    let in_flight = Arc::clone(&controller);
    let first = tokio::spawn(async move { in_flight.request_status_change(OfficeStatus::Busy).await });
    backend.called.notified().await;

    controller.observe(&StatusRecord::new(OfficeStatus::Available, "other", 43, None));
    assert_eq!(controller.snapshot().current_status, OfficeStatus::Busy);

    backend.release.notify_one();
    first.await.expect("join").expect("change");
}
