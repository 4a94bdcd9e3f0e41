use std::sync::Arc;

use message_composer::{GeminiClient, MessageComposer};
use shared::OfficeStatus;
use tracing::{info, warn};

pub mod connection;
pub mod controller;
pub mod credentials;
pub mod presenter;
pub mod settings;
pub mod setup;
pub mod subscriber;
pub mod view;

pub use connection::{ConnectionError, StoreConnection, StoreConnector};
pub use controller::{ControllerError, ControllerSnapshot, StatusController};
pub use credentials::{resolve_credentials, CredentialStore, FileCredentialStore};
pub use presenter::{DisplayFrame, DisplayPresenter, ManagerFrame, StatusTone};
pub use settings::{default_config_dir, load_settings, AppSettings};
pub use setup::{CredentialField, SetupError, SetupStep, SetupWizard};
pub use subscriber::{StatusSubscriber, SubscriberHandle};
pub use view::StatusView;

/// Composer backed by Gemini when an API key is configured, canned messages otherwise.
pub fn build_composer(settings: &AppSettings) -> MessageComposer {
    let Some(api_key) = settings
        .gemini_api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
    else {
        info!("composer: no generation API key configured, using default messages");
        return MessageComposer::offline();
    };

    match GeminiClient::new(&settings.generation_url, api_key, settings.http_timeout()) {
        Ok(client) => MessageComposer::new(Arc::new(client), settings.gemini_model.clone()),
        Err(err) => {
            warn!("composer: failed to build generation client, using default messages: {err}");
            MessageComposer::offline()
        }
    }
}

/// One client process: a local view kept in sync by a single subscription,
/// plus the status controller when running as the manager.
pub struct StatusClient {
    connection: Arc<StoreConnection>,
    view: StatusView,
    controller: Option<Arc<StatusController>>,
    subscription: SubscriberHandle,
}

impl StatusClient {
    pub async fn start_display(connection: Arc<StoreConnection>) -> Self {
        let view = StatusView::default();
        let sink = view.clone();
        let subscription =
            StatusSubscriber::start(&connection, move |record| sink.apply(record)).await;
        Self {
            connection,
            view,
            controller: None,
            subscription,
        }
    }

    pub async fn start_manager(connection: Arc<StoreConnection>, composer: MessageComposer) -> Self {
        let view = StatusView::default();
        let controller = Arc::new(StatusController::new(
            composer,
            Arc::clone(&connection),
            view.clone(),
        ));

        let sink = view.clone();
        let observer = Arc::clone(&controller);
        let subscription = StatusSubscriber::start(&connection, move |record| {
            observer.observe(&record);
            sink.apply(record);
        })
        .await;

        Self {
            connection,
            view,
            controller: Some(controller),
            subscription,
        }
    }

    pub fn view(&self) -> &StatusView {
        &self.view
    }

    pub fn controller(&self) -> Option<&Arc<StatusController>> {
        self.controller.as_ref()
    }

    pub fn connection(&self) -> &Arc<StoreConnection> {
        &self.connection
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn current_status(&self) -> OfficeStatus {
        self.view.current().status
    }

    pub fn shutdown(&mut self) {
        self.subscription.cancel();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
