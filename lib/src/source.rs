//! Single remote data source speaking the `{status, data}` JSON envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::Unavailable;
use crate::DEFAULT_TIMEOUT;

/// Immutable HTTP settings handed to every source at construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("btcdata/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub(crate) fn build_client(&self) -> Result<Client, Unavailable> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                debug!("failed to build HTTP client: {e}");
                Unavailable
            })
    }
}

/// Why a fetch failed. Only ever logged; callers see [`Unavailable`].
#[derive(Error, Debug)]
pub(crate) enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    HttpStatus(StatusCode),
    #[error("envelope status is '{0}'")]
    Envelope(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("field '{0}' missing from payload")]
    FieldMissing(&'static str),
    #[error("field '{0}' has an unusable value: {1}")]
    InvalidField(&'static str, String),
}

/// Something that can answer a path with a JSON payload
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human readable identification used in logs
    fn name(&self) -> &str;

    /// Fetches `path` and returns the payload, or [`Unavailable`] on any failure
    async fn fetch(&self, path: &str) -> Result<Value, Unavailable>;
}

#[derive(Deserialize)]
struct Envelope {
    status: String,
    data: Option<Value>,
}

/// Chain explorer reachable over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, config: &ClientConfig) -> Result<Self, Unavailable> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            client: config.build_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn try_fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let body = response.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if envelope.status != "success" {
            return Err(FetchError::Envelope(envelope.status));
        }

        envelope
            .data
            .ok_or_else(|| FetchError::Malformed("envelope has no data".to_string()))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, path: &str) -> Result<Value, Unavailable> {
        self.try_fetch(path).await.map_err(|e| {
            debug!("{}{path}: {e}", self.base_url);
            Unavailable
        })
    }
}
