//! Qdrant REST vector index (feature `api_index`).
//!
//! Qdrant point ids must be integers or UUIDs, so each identity key maps to a
//! name-based UUIDv5 and the key itself travels in the point payload.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MarksError, Result};
use crate::vector::VectorIndex;

#[derive(Clone)]
pub struct QdrantConfig {
    /// Cluster base URL, e.g. `http://localhost:6333`.
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            api_key: None,
            timeout: Duration::from_secs(15),
            max_retries: 3,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Upserts mark vectors into one Qdrant collection.
#[derive(Clone)]
pub struct QdrantVectorIndex {
    client: Client,
    endpoint: String,
    max_retries: usize,
}

/// Stable Qdrant point id for an identity key.
#[must_use]
pub fn point_id(identity_key: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, identity_key.as_bytes())
}

impl QdrantVectorIndex {
    pub fn new(config: QdrantConfig) -> Result<Self> {
        if !(config.url.starts_with("http://") || config.url.starts_with("https://")) {
            return Err(config_error("Qdrant url must be an http(s) URL"));
        }
        if config.collection.trim().is_empty() || config.collection.contains('/') {
            return Err(config_error(format!(
                "invalid Qdrant collection {:?}",
                config.collection
            )));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = config.api_key.as_deref() {
            headers.insert(
                "api-key",
                HeaderValue::from_str(api_key.trim())
                    .map_err(|_| config_error("invalid Qdrant API key"))?,
            );
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| config_error(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/collections/{}/points?wait=true",
                config.url.trim_end_matches('/'),
                config.collection
            ),
            max_retries: config.max_retries.max(1),
        })
    }
}

impl VectorIndex for QdrantVectorIndex {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<usize> {
        let request = UpsertRequest {
            points: [Point {
                id: point_id(id),
                vector,
                payload: PointPayload { identity_key: id },
            }],
        };

        let mut attempt = 0usize;
        loop {
            match self.client.put(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: UpsertResponse = resp.json().map_err(|err| {
                            index_error(format!("unreadable Qdrant response: {err}"))
                        })?;
                        if parsed.status != "ok" {
                            return Err(index_error(format!(
                                "Qdrant reported status {:?}",
                                parsed.status
                            )));
                        }
                        return Ok(request.points.len());
                    }
                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::debug!(target = "marks::index", %status, attempt, "retrying Qdrant upsert");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(index_error(format!(
                        "Qdrant upsert failed ({status}): {body}"
                    )));
                }
                Err(err) => {
                    if (err.is_connect() || err.is_timeout()) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::debug!(target = "marks::index", error = %err, attempt, "retrying Qdrant upsert");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(index_error(err.to_string()));
                }
            }
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

fn config_error(reason: impl Into<String>) -> MarksError {
    MarksError::Config {
        reason: reason.into(),
    }
}

fn index_error(reason: impl Into<String>) -> MarksError {
    MarksError::VectorIndex {
        reason: reason.into(),
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    points: [Point<'a>; 1],
}

#[derive(Serialize)]
struct Point<'a> {
    id: Uuid,
    vector: &'a [f32],
    payload: PointPayload<'a>,
}

#[derive(Serialize)]
struct PointPayload<'a> {
    identity_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(default)]
    status: String,
}
