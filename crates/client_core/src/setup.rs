//! Two-step credential setup: read the instructions, then enter the values.

use shared::{protocol::default_database_url, StoreCredentials};
use thiserror::Error;
use tracing::{info, warn};

use crate::{connection::StoreConnection, credentials::CredentialStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    CollectingInstructions,
    CollectingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    ApiKey,
    ProjectId,
    DatabaseUrl,
    AuthDomain,
    StorageBucket,
    MessagingSenderId,
    AppId,
    AuthToken,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("setup is still on the instructions step")]
    NotReady,
    #[error("please fill in at least the API key and the project id")]
    MissingRequiredFields,
    #[error("could not connect with these settings; check the values and try again")]
    ConnectionFailed,
}

pub struct SetupWizard {
    step: SetupStep,
    input: StoreCredentials,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupWizard {
    pub fn new() -> Self {
        Self {
            step: SetupStep::CollectingInstructions,
            input: StoreCredentials::default(),
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn input(&self) -> &StoreCredentials {
        &self.input
    }

    pub fn next(&mut self) {
        self.step = SetupStep::CollectingCredentials;
    }

    pub fn back(&mut self) {
        self.step = SetupStep::CollectingInstructions;
    }

    pub fn set_field(&mut self, field: CredentialField, value: impl Into<String>) {
        let value = value.into();
        let optional = || Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match field {
            CredentialField::ApiKey => self.input.api_key = value.trim().to_string(),
            CredentialField::ProjectId => self.input.project_id = value.trim().to_string(),
            CredentialField::DatabaseUrl => self.input.database_url = optional(),
            CredentialField::AuthDomain => self.input.auth_domain = optional(),
            CredentialField::StorageBucket => self.input.storage_bucket = optional(),
            CredentialField::MessagingSenderId => self.input.messaging_sender_id = optional(),
            CredentialField::AppId => self.input.app_id = optional(),
            CredentialField::AuthToken => self.input.auth_token = optional(),
        }
    }

    /// Validates, persists and connects. On any failure the wizard stays on
    /// the credentials step so the user can correct the values and retry.
    pub async fn submit(
        &mut self,
        credentials: &dyn CredentialStore,
        connection: &StoreConnection,
    ) -> Result<StoreCredentials, SetupError> {
        if self.step != SetupStep::CollectingCredentials {
            return Err(SetupError::NotReady);
        }
        if !self.input.is_usable() {
            return Err(SetupError::MissingRequiredFields);
        }

        let mut finished = self.input.clone();
        if finished.database_url.is_none() {
            finished.database_url = Some(default_database_url(&finished.project_id));
        }

        if let Err(err) = credentials.save(&finished) {
            warn!("setup: failed to save credentials: {err}");
            return Err(SetupError::ConnectionFailed);
        }

        connection.reset().await;
        if let Err(err) = connection.connect(&finished).await {
            warn!("setup: connection attempt failed: {err}");
            return Err(SetupError::ConnectionFailed);
        }

        info!(project_id = %finished.project_id, "setup: credentials saved and connected");
        Ok(finished)
    }
}

#[cfg(test)]
#[path = "tests/setup_tests.rs"]
mod tests;
