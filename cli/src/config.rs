use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use btcdata::nethash::NetHashSource;
use btcdata::{ChainMetrics, ClientConfig, Resolver, DEFAULT_NETHASH_URL, DEFAULT_SOURCE};
use serde::{Deserialize, Serialize};

pub fn generate_config_template(path: &Path) -> Result<()> {
    let config_str = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, config_str)?;

    println!("Config template generated at: {}", path.display());

    Ok(())
}

/// Where the numbers come from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    /// Chain explorers in order of preference
    pub base_urls: Vec<String>,
    /// Plain-text network hash rate estimate (GH/s); commands relying on it
    /// fail when unset
    pub nethash_url: Option<String>,
    pub user_agent: String,
    /// Per-request limit in seconds
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_urls: vec![DEFAULT_SOURCE.to_string()],
            nethash_url: Some(DEFAULT_NETHASH_URL.to_string()),
            user_agent: client.user_agent,
            timeout_secs: client.timeout.as_secs(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write daily rotated logs here instead of stderr
    pub directory: Option<PathBuf>,
}

/// btcstats configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("read config file '{}'", path.as_ref().display()))?;

        let config: Config = toml::from_str(&config_str).context("deserialize config from TOML")?;
        config.validate()?;

        Ok(config)
    }

    /// Loads config from file, falling back to built-in defaults when the
    /// file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.base_urls.is_empty() {
            anyhow::bail!("No data sources found in config");
        }
        if self.sources.timeout_secs == 0 {
            anyhow::bail!("Source timeout must be at least one second");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.sources.user_agent.clone(),
            timeout: Duration::from_secs(self.sources.timeout_secs),
        }
    }

    /// Builds the resolver and secondary source described by this config
    pub fn chain_metrics(&self) -> Result<ChainMetrics> {
        let client = self.client_config();

        let resolver = Resolver::from_urls(self.sources.base_urls.iter().cloned(), &client)
            .context("create chain explorer clients")?;
        let nethash = self
            .sources
            .nethash_url
            .as_ref()
            .map(|url| NetHashSource::new(url.clone(), &client))
            .transpose()
            .context("create hash rate estimate client")?;

        Ok(ChainMetrics::new(resolver, nethash))
    }
}
