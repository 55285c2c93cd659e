//! Destination persistence boundary.
//!
//! The edit workflow only talks to [`DestinationApi`]; [`HttpDestinationApi`]
//! is the implementation used against a running platform.

use crate::destination::{Destination, DestinationPatch};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait DestinationApi: Send + Sync {
    /// Fetch one destination by id.
    async fn fetch(&self, id: &str) -> Result<Destination, ApiError>;

    /// Persist an edit and return the updated record. Never retried by callers.
    async fn update(&self, id: &str, patch: &DestinationPatch) -> Result<Destination, ApiError>;
}

pub struct HttpDestinationApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpDestinationApi {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(api_url).map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn destination_url(&self, id: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(["api", "destinations", id]);
        Ok(url)
    }

    async fn read_destination(
        &self,
        id: &str,
        response: reqwest::Response,
    ) -> Result<Destination, ApiError> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, destination = id, "destination API returned an error");
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

/// Pull a human message out of an error body: JSON `message`/`error`/`detail`,
/// else the trimmed body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(msg) = json.get(field).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(err.to_string())
    } else {
        ApiError::Http(err)
    }
}

#[async_trait]
impl DestinationApi for HttpDestinationApi {
    async fn fetch(&self, id: &str) -> Result<Destination, ApiError> {
        let url = self.destination_url(id)?;
        debug!(%url, "fetching destination");
        let response = self.client.get(url).send().await.map_err(map_transport)?;
        self.read_destination(id, response).await
    }

    async fn update(&self, id: &str, patch: &DestinationPatch) -> Result<Destination, ApiError> {
        let url = self.destination_url(id)?;
        debug!(%url, properties = patch.config.len(), "updating destination");
        let response = self
            .client
            .put(url)
            .json(patch)
            .send()
            .await
            .map_err(map_transport)?;
        self.read_destination(id, response).await
    }
}

/// A simple in-memory API, mainly for testing.
///
/// Updates are applied to the stored record unless a failure has been queued
/// with [`MemoryDestinationApi::fail_next_update`].
#[derive(Default)]
pub struct MemoryDestinationApi {
    records: Mutex<HashMap<String, Destination>>,
    pending_failure: Mutex<Option<String>>,
    updates: Mutex<Vec<(String, DestinationPatch)>>,
}

impl MemoryDestinationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(destination: Destination) -> Self {
        let api = Self::new();
        api.insert(destination);
        api
    }

    pub fn insert(&self, destination: Destination) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(destination.id.clone(), destination);
        }
    }

    pub fn get(&self, id: &str) -> Option<Destination> {
        self.records.lock().ok()?.get(id).cloned()
    }

    /// Make the next `update` fail with `message` (reported as a 409).
    pub fn fail_next_update(&self, message: impl Into<String>) {
        if let Ok(mut pending) = self.pending_failure.lock() {
            *pending = Some(message.into());
        }
    }

    /// Every update received, successful or not.
    pub fn updates(&self) -> Vec<(String, DestinationPatch)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> ApiError {
    ApiError::Other(format!("lock poisoned: {}", e))
}

#[async_trait]
impl DestinationApi for MemoryDestinationApi {
    async fn fetch(&self, id: &str) -> Result<Destination, ApiError> {
        self.records
            .lock()
            .map_err(poisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, patch: &DestinationPatch) -> Result<Destination, ApiError> {
        self.updates
            .lock()
            .map_err(poisoned)?
            .push((id.to_string(), patch.clone()));

        if let Some(message) = self.pending_failure.lock().map_err(poisoned)?.take() {
            return Err(ApiError::Status {
                status: 409,
                message,
            });
        }

        let mut records = self.records.lock().map_err(poisoned)?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        record.name = patch.name.clone();
        record.description = patch.description.clone();
        record.config = patch.config.clone();
        Ok(record.clone())
    }
}
