use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{domain::OfficeStatus, error::RecordError};

/// Domain suffix of Firebase realtime database instances created by the console.
pub const RTDB_DEFAULT_DOMAIN: &str = "firebaseio.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub status: OfficeStatus,
    pub message: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_context: Option<String>,
}

impl StatusRecord {
    pub fn new(
        status: OfficeStatus,
        message: impl Into<String>,
        timestamp: i64,
        custom_context: Option<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            timestamp,
            custom_context,
        }
    }

    /// Local view used before the store has delivered anything.
    pub fn initial() -> Self {
        Self::new(
            OfficeStatus::Available,
            OfficeStatus::Available.default_message(),
            Utc::now().timestamp_millis(),
            None,
        )
    }

    /// Validates a raw store push. Anything without a recognized `status`,
    /// a string `message` and an integral `timestamp` is rejected whole.
    pub fn from_push(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;

        let raw_status = object
            .get("status")
            .ok_or(RecordError::MissingField("status"))?;
        let status = match raw_status {
            Value::String(s) => serde_json::from_value::<OfficeStatus>(Value::String(s.clone()))
                .map_err(|_| RecordError::UnknownStatus(s.clone()))?,
            other => return Err(RecordError::UnknownStatus(other.to_string())),
        };

        let message = object
            .get("message")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("message"))?;

        let timestamp = match object.get("timestamp") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| RecordError::Malformed(format!("timestamp {n}")))?,
            Some(other) => return Err(RecordError::Malformed(format!("timestamp {other}"))),
            None => return Err(RecordError::MissingField("timestamp")),
        };

        let custom_context = object
            .get("customContext")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self::new(status, message, timestamp, custom_context))
    }
}

/// Connection credentials for the realtime store, as shown in the
/// Firebase console's web-app config. Snake case on disk, camel case
/// accepted so a pasted console snippet also loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCredentials {
    #[serde(alias = "apiKey")]
    pub api_key: String,
    #[serde(alias = "projectId")]
    pub project_id: String,
    #[serde(default, alias = "databaseURL", skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default, alias = "authDomain", skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, alias = "storageBucket", skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(
        default,
        alias = "messagingSenderId",
        skip_serializing_if = "Option::is_none"
    )]
    pub messaging_sender_id: Option<String>,
    #[serde(default, alias = "appId", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Database secret or ID token sent as `?auth=` on REST calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl StoreCredentials {
    /// Project used when nothing has been configured locally.
    pub fn builtin_default() -> Self {
        Self {
            api_key: String::new(),
            project_id: "mudirstatus".into(),
            database_url: Some(default_database_url("mudirstatus")),
            auth_domain: Some("mudirstatus.firebaseapp.com".into()),
            storage_bucket: Some("mudirstatus.firebasestorage.app".into()),
            messaging_sender_id: None,
            app_id: None,
            auth_token: None,
        }
    }

    /// Both mandatory fields are present.
    pub fn is_usable(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    pub fn resolved_database_url(&self) -> String {
        match self.database_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => default_database_url(self.project_id.trim()),
        }
    }
}

pub fn default_database_url(project_id: &str) -> String {
    format!("https://{project_id}-default-rtdb.{RTDB_DEFAULT_DOMAIN}")
}
