//! Firebase Realtime Database over its REST interface.
//!
//! Writes are `PUT {db}/{path}.json`. Subscriptions use the streaming variant of
//! `GET {db}/{path}.json` (`Accept: text/event-stream`), whose `put`/`patch`
//! events are folded into a local mirror so every push is the whole record.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use shared::{StatusRecord, StoreCredentials};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    sse::{RemoteMirror, SseDecoder},
    StatusStore, StatusSubscription, StoreError, SUBSCRIPTION_BUFFER,
};

const WRITE_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    path: String,
    #[serde(default)]
    data: Value,
}

#[derive(Clone)]
pub struct FirebaseStatusStore {
    http: Client,
    stream_http: Client,
    record_url: Url,
}

impl FirebaseStatusStore {
    pub fn new(
        database_url: &str,
        status_path: &str,
        auth_token: Option<&str>,
    ) -> Result<Self, StoreError> {
        let record_url = build_record_url(database_url, status_path, auth_token)?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(WRITE_TIMEOUT)
            .build()?;
        // No overall timeout: the event stream stays open for the process lifetime.
        let stream_http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            http,
            stream_http,
            record_url,
        })
    }

    pub fn from_credentials(
        credentials: &StoreCredentials,
        status_path: &str,
    ) -> Result<Self, StoreError> {
        Self::new(
            &credentials.resolved_database_url(),
            status_path,
            credentials.auth_token.as_deref(),
        )
    }

    pub fn record_url(&self) -> &Url {
        &self.record_url
    }
}

fn build_record_url(
    database_url: &str,
    status_path: &str,
    auth_token: Option<&str>,
) -> Result<Url, StoreError> {
    let invalid = |reason: String| StoreError::InvalidUrl {
        url: database_url.to_string(),
        reason,
    };

    let base = Url::parse(database_url.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }
    if base.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    let path = status_path.trim_matches('/');
    if path.is_empty() {
        return Err(invalid("empty status path".to_string()));
    }

    let mut url = base
        .join(&format!("/{path}.json"))
        .map_err(|err| invalid(err.to_string()))?;
    if let Some(token) = auth_token.map(str::trim).filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("auth", token);
    }
    Ok(url)
}

async fn error_for_response(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Status { status, body }
}

#[async_trait]
impl StatusStore for FirebaseStatusStore {
    async fn write(&self, record: &StatusRecord) -> Result<(), StoreError> {
        let response = self
            .http
            .put(self.record_url.clone())
            .json(record)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        info!(status = %record.status, timestamp = record.timestamp, "store: record written");
        Ok(())
    }

    async fn subscribe(&self) -> Result<StatusSubscription, StoreError> {
        let response = self
            .stream_http
            .get(self.record_url.clone())
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut body = response.bytes_stream();
        let reader = tokio::spawn(async move {
            let mut decoder = SseDecoder::default();
            let mut mirror = RemoteMirror::default();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        warn!("store: event stream interrupted: {err}");
                        return;
                    }
                };

                for event in decoder.push(&chunk) {
                    match event.event.as_str() {
                        "put" | "patch" => {
                            let payload = match serde_json::from_str::<StreamPayload>(&event.data)
                            {
                                Ok(payload) => payload,
                                Err(err) => {
                                    debug!("store: ignoring undecodable {} event: {err}", event.event);
                                    continue;
                                }
                            };
                            if event.event == "put" {
                                mirror.put(&payload.path, payload.data);
                            } else {
                                mirror.patch(&payload.path, payload.data);
                            }
                            if tx.send(mirror.value().clone()).await.is_err() {
                                return;
                            }
                        }
                        "keep-alive" => {}
                        "cancel" | "auth_revoked" => {
                            warn!(event = %event.event, "store: subscription ended by server");
                            return;
                        }
                        other => debug!(event = other, "store: ignoring stream event"),
                    }
                }
            }
            debug!("store: event stream closed");
        });

        Ok(StatusSubscription::new(rx, reader))
    }
}

#[cfg(test)]
#[path = "tests/firebase_tests.rs"]
mod tests;
