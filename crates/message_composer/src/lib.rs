use std::sync::Arc;

use async_trait::async_trait;
use shared::OfficeStatus;
use thiserror::Error;
use tracing::{info, warn};

mod gemini;
mod prompt;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use prompt::prompt_for;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend is not configured")]
    NotConfigured,
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed generation response: {0}")]
    Malformed(String),
}

/// External text generation: one attempt, no streaming.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>, GenerationError>;
}

pub struct MissingGenerationBackend;

#[async_trait]
impl GenerationBackend for MissingGenerationBackend {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<Option<String>, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

pub fn default_message(status: OfficeStatus) -> &'static str {
    status.default_message()
}

/// Turns a status plus optional free-text context into display text.
#[derive(Clone)]
pub struct MessageComposer {
    backend: Arc<dyn GenerationBackend>,
    model: String,
}

impl MessageComposer {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Composer that always yields the canned messages.
    pub fn offline() -> Self {
        Self::new(Arc::new(MissingGenerationBackend), DEFAULT_MODEL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Never fails: empty context, empty generations and backend errors all
    /// resolve to the status's default message.
    pub async fn compose(&self, status: OfficeStatus, context: &str) -> String {
        if context.trim().is_empty() {
            return default_message(status).to_string();
        }

        let prompt = prompt_for(status, context);
        match self.backend.generate(&self.model, &prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!(%status, model = %self.model, "composer: generated status message");
                text.trim().to_string()
            }
            Ok(_) => {
                warn!(%status, "composer: empty generation, using default message");
                default_message(status).to_string()
            }
            Err(err) => {
                warn!(%status, "composer: generation failed, using default message: {err}");
                default_message(status).to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/composer_tests.rs"]
mod tests;
