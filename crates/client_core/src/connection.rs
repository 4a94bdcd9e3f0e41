//! Explicitly owned handle to the realtime store.

use std::sync::Arc;

use realtime_store::{FirebaseStatusStore, StatusStore, StoreError};
use shared::{domain::DEFAULT_STATUS_PATH, StoreCredentials};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("store connection is not initialized")]
    NotConnected,
    #[error("failed to open store: {0}")]
    Open(#[from] StoreError),
}

/// Opens a store for a credential set.
pub trait StoreConnector: Send + Sync {
    fn open(
        &self,
        credentials: &StoreCredentials,
        status_path: &str,
    ) -> Result<Arc<dyn StatusStore>, StoreError>;
}

pub struct FirebaseConnector;

impl StoreConnector for FirebaseConnector {
    fn open(
        &self,
        credentials: &StoreCredentials,
        status_path: &str,
    ) -> Result<Arc<dyn StatusStore>, StoreError> {
        Ok(Arc::new(FirebaseStatusStore::from_credentials(
            credentials,
            status_path,
        )?))
    }
}

/// Always hands out the same store, whatever the credentials.
pub struct FixedConnector(pub Arc<dyn StatusStore>);

impl StoreConnector for FixedConnector {
    fn open(
        &self,
        _credentials: &StoreCredentials,
        _status_path: &str,
    ) -> Result<Arc<dyn StatusStore>, StoreError> {
        Ok(Arc::clone(&self.0))
    }
}

pub struct StoreConnection {
    connector: Box<dyn StoreConnector>,
    status_path: String,
    current: RwLock<Option<Arc<dyn StatusStore>>>,
}

impl StoreConnection {
    pub fn new(connector: Box<dyn StoreConnector>, status_path: impl Into<String>) -> Self {
        Self {
            connector,
            status_path: status_path.into(),
            current: RwLock::new(None),
        }
    }

    pub fn firebase(status_path: impl Into<String>) -> Self {
        Self::new(Box::new(FirebaseConnector), status_path)
    }

    /// Connection that is already open on `store`; `connect` keeps returning it.
    pub fn with_store(store: Arc<dyn StatusStore>) -> Self {
        Self {
            connector: Box::new(FixedConnector(Arc::clone(&store))),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            current: RwLock::new(Some(store)),
        }
    }

    pub fn status_path(&self) -> &str {
        &self.status_path
    }

    /// Replaces any open store with one built from `credentials`. On failure
    /// the connection is left closed.
    pub async fn connect(&self, credentials: &StoreCredentials) -> Result<(), ConnectionError> {
        let mut current = self.current.write().await;
        *current = None;
        let store = self.connector.open(credentials, &self.status_path)?;
        *current = Some(store);
        info!(
            project_id = %credentials.project_id,
            path = %self.status_path,
            "store: connection initialized"
        );
        Ok(())
    }

    pub async fn reset(&self) {
        self.current.write().await.take();
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn store(&self) -> Result<Arc<dyn StatusStore>, ConnectionError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(ConnectionError::NotConnected)
    }
}
