//! Priority-ordered fallback across data sources.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Unavailable;
use crate::source::{ClientConfig, DataSource, HttpSource};

/// Tries each source once, in order, and keeps the first payload
pub struct Resolver {
    sources: Vec<Box<dyn DataSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn DataSource>>) -> Self {
        Self { sources }
    }

    /// One [`HttpSource`] per base URL, in the given order
    pub fn from_urls<I, S>(base_urls: I, config: &ClientConfig) -> Result<Self, Unavailable>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources = base_urls
            .into_iter()
            .map(|url| {
                HttpSource::new(url, config).map(|source| Box::new(source) as Box<dyn DataSource>)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(sources))
    }

    pub fn sources(&self) -> &[Box<dyn DataSource>] {
        &self.sources
    }

    /// Returns the first successful payload for `path`.
    ///
    /// No retries: every source is asked exactly once, so total latency is
    /// bounded by the sum of the per-source timeouts.
    pub async fn resolve(&self, path: &str) -> Result<Value, Unavailable> {
        for source in &self.sources {
            match source.fetch(path).await {
                Ok(payload) => return Ok(payload),
                Err(Unavailable) => debug!("source {} failed for {path}", source.name()),
            }
        }

        warn!(
            "all {} data sources failed for {path}",
            self.sources.len()
        );
        Err(Unavailable)
    }
}
