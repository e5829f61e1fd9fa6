//! Secondary source: a bare plain-text network hash rate estimate.

use reqwest::Client;
use tracing::debug;

use crate::error::Unavailable;
use crate::source::{ClientConfig, FetchError};

/// Three-day average network hash rate, published as a single number in GH/s
#[derive(Debug, Clone)]
pub struct NetHashSource {
    url: String,
    client: Client,
}

impl NetHashSource {
    pub fn new(url: impl Into<String>, config: &ClientConfig) -> Result<Self, Unavailable> {
        Ok(Self {
            url: url.into(),
            client: config.build_client()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Latest estimate in GH/s
    pub async fn estimate(&self) -> Result<f64, Unavailable> {
        self.try_estimate().await.map_err(|e| {
            debug!("{}: {e}", self.url);
            Unavailable
        })
    }

    async fn try_estimate(&self) -> Result<f64, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        parse_estimate(&response.text().await?)
    }
}

fn parse_estimate(body: &str) -> Result<f64, FetchError> {
    let value: f64 = body
        .trim()
        .parse()
        .map_err(|_| FetchError::Malformed(format!("'{}' is not a number", body.trim())))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(FetchError::InvalidField("estimate", value.to_string()));
    }
    Ok(value)
}
