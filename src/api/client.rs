//! Bounded-timeout HTTP client for the content source.
//!
//! One call is one attempt with one definitive outcome: the envelope, or a
//! [`ContentError`] saying which way it failed. Retries are not done here.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::api::types::ContentEnvelope;
use crate::config::Config;

/// Failure of a single content-source call.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Connection, DNS, TLS or body-transfer failure
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The call did not finish before its deadline and was cancelled
    #[error("request to {endpoint} timed out after {}ms", .timeout.as_millis())]
    Timeout { endpoint: String, timeout: Duration },

    /// Non-2xx response
    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: String, status: StatusCode },

    /// Body is not an envelope, the payload has the wrong shape, or the
    /// envelope reports `success: false`
    #[error("invalid envelope from {endpoint}: {reason}")]
    Envelope { endpoint: String, reason: String },

    /// Identifier-based lookup with no remote match
    #[error("no content found at {endpoint}")]
    NotFound { endpoint: String },
}

impl ContentError {
    /// Stable short name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::Network { .. } => "network",
            ContentError::Timeout { .. } => "timeout",
            ContentError::Http { .. } => "http",
            ContentError::Envelope { .. } => "envelope",
            ContentError::NotFound { .. } => "not_found",
        }
    }

    /// Reclassify a 404 as `NotFound` for lookups by identifier.
    pub fn into_lookup_error(self) -> Self {
        match self {
            ContentError::Http { endpoint, status } if status == StatusCode::NOT_FOUND => {
                ContentError::NotFound { endpoint }
            }
            other => other,
        }
    }
}

/// A single outbound call.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    endpoint: String,
    method: Method,
    query: Vec<(String, String)>,
    body: Option<Value>,
    freshness: Option<Duration>,
    timeout: Option<Duration>,
}

impl ContentRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::GET,
            query: Vec::new(),
            body: None,
            freshness: None,
            timeout: None,
        }
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(endpoint)
        }
    }

    /// Append a query parameter. Order is preserved.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Allow intermediary caches to reuse the response for `window`.
    pub fn freshness(mut self, window: Duration) -> Self {
        self.freshness = Some(window);
        self
    }

    /// Override the client's default deadline for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ContentClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build content HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.api_url, config.api_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one bounded call and decode the envelope.
    ///
    /// The envelope is returned as-is, including `success: false`; the typed
    /// payload is only decoded when `success` is true.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: ContentRequest,
    ) -> Result<ContentEnvelope<T>, ContentError> {
        let deadline = request.timeout.unwrap_or(self.timeout);
        let endpoint = request.endpoint.clone();

        // Dropping the inner future on expiry cancels the in-flight request.
        match tokio::time::timeout(deadline, self.execute(request)).await {
            Ok(Err(ContentError::Network { endpoint, source })) if source.is_timeout() => {
                Err(ContentError::Timeout {
                    endpoint,
                    timeout: deadline,
                })
            }
            Ok(result) => result,
            Err(_) => Err(ContentError::Timeout {
                endpoint,
                timeout: deadline,
            }),
        }
    }

    /// Like [`call`](Self::call), but a `success: false` envelope is an error.
    pub async fn call_content<T: DeserializeOwned>(
        &self,
        request: ContentRequest,
    ) -> Result<T, ContentError> {
        let endpoint = request.endpoint.clone();
        let envelope = self.call::<T>(request).await?;

        if !envelope.success {
            return Err(ContentError::Envelope {
                endpoint,
                reason: envelope
                    .message
                    .unwrap_or_else(|| "success flag is false".to_string()),
            });
        }

        envelope.into_payload().ok_or(ContentError::Envelope {
            endpoint,
            reason: "missing data".to_string(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: ContentRequest,
    ) -> Result<ContentEnvelope<T>, ContentError> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        let endpoint = request.endpoint;

        let mut builder = self.http.request(request.method, &url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(window) = request.freshness {
            builder = builder.header(CACHE_CONTROL, format!("max-age={}", window.as_secs()));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("Calling content source: {}", url);

        let response = builder.send().await.map_err(|source| ContentError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Http { endpoint, status });
        }

        let body = response.bytes().await.map_err(|source| ContentError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;

        decode_envelope(&endpoint, &body)
    }
}

/// Decode in two steps so a `success: false` envelope never has its payload
/// interpreted, whatever that payload looks like.
fn decode_envelope<T: DeserializeOwned>(
    endpoint: &str,
    body: &[u8],
) -> Result<ContentEnvelope<T>, ContentError> {
    let raw: ContentEnvelope<Value> =
        serde_json::from_slice(body).map_err(|e| ContentError::Envelope {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

    let data = match (raw.success, raw.data) {
        (true, Some(value)) if !value.is_null() => {
            Some(
                serde_json::from_value(value).map_err(|e| ContentError::Envelope {
                    endpoint: endpoint.to_string(),
                    reason: format!("payload does not match expected shape: {}", e),
                })?,
            )
        }
        _ => None,
    };

    Ok(ContentEnvelope {
        success: raw.success,
        data,
        message: raw.message,
        timestamp: raw.timestamp,
    })
}
