//! Typed access to the chain explorer payloads.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{self, Unavailable};
use crate::estimate::{estimated_next_difficulty, percent_difficulty_change};
use crate::nethash::NetHashSource;
use crate::resolver::Resolver;
use crate::source::FetchError;
use crate::DIFFICULTY_UPDATE_INTERVAL;

/// Network overview path
pub const INFO_PATH: &str = "/api/v2/get_info/BTC";

/// Block lookup path for `id`
pub fn block_path(id: &BlockId) -> String {
    format!("/api/v2/get_block/BTC/{id}")
}

/// A block is addressed either by height or by hash; the explorer takes both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        BlockId::Height(height)
    }
}

impl FromStr for BlockId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(height) => BlockId::Height(height),
            Err(_) => BlockId::Hash(s.to_string()),
        })
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Height(height) => write!(f, "{height}"),
            BlockId::Hash(hash) => f.write_str(hash),
        }
    }
}

/// Network state at the moment of the query
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSnapshot {
    pub block_height: u64,
    pub difficulty: f64,
    /// Hashes per second
    pub network_hashrate: f64,
    pub block_timestamp: Option<DateTime<Utc>>,
}

impl ChainSnapshot {
    fn from_payload(payload: &Value) -> Result<Self, FetchError> {
        Ok(Self {
            block_height: height_field(payload, "blocks")?,
            difficulty: positive_field(payload, "mining_difficulty")?,
            network_hashrate: positive_field(payload, "hashrate")?,
            block_timestamp: match payload.get("time") {
                Some(_) => Some(timestamp_field(payload, "time")?),
                None => None,
            },
        })
    }
}

/// One historical block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    /// Identifier the block was requested with
    pub block_id: BlockId,
    pub height: Option<u64>,
    pub difficulty: f64,
    pub timestamp: DateTime<Utc>,
}

impl BlockRecord {
    fn from_payload(block_id: BlockId, payload: &Value) -> Result<Self, FetchError> {
        Ok(Self {
            block_id,
            height: match payload.get("block_no") {
                Some(_) => Some(height_field(payload, "block_no")?),
                None => None,
            },
            difficulty: positive_field(payload, "mining_difficulty")?,
            timestamp: timestamp_field(payload, "time")?,
        })
    }
}

/// Explorers disagree on whether numbers are sent as JSON numbers or strings
fn number_field(payload: &Value, key: &'static str) -> Result<f64, FetchError> {
    let value = payload.get(key).ok_or(FetchError::FieldMissing(key))?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| FetchError::InvalidField(key, value.to_string()))
}

fn positive_field(payload: &Value, key: &'static str) -> Result<f64, FetchError> {
    let value = number_field(payload, key)?;
    if value <= 0.0 {
        return Err(FetchError::InvalidField(key, value.to_string()));
    }
    Ok(value)
}

fn height_field(payload: &Value, key: &'static str) -> Result<u64, FetchError> {
    let value = payload.get(key).ok_or(FetchError::FieldMissing(key))?;
    let height = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    height.ok_or_else(|| FetchError::InvalidField(key, value.to_string()))
}

fn timestamp_field(payload: &Value, key: &'static str) -> Result<DateTime<Utc>, FetchError> {
    let secs = number_field(payload, key)?;
    DateTime::from_timestamp(secs as i64, 0)
        .ok_or_else(|| FetchError::InvalidField(key, secs.to_string()))
}

/// Chain metrics backed by the fallback resolver and, optionally, the
/// plain-text hash rate estimate
pub struct ChainMetrics {
    resolver: Resolver,
    nethash: Option<NetHashSource>,
}

impl ChainMetrics {
    pub fn new(resolver: Resolver, nethash: Option<NetHashSource>) -> Self {
        Self { resolver, nethash }
    }

    /// Fresh network snapshot
    pub async fn current_snapshot(&self) -> Result<ChainSnapshot, Unavailable> {
        let payload = self.resolver.resolve(INFO_PATH).await?;
        extract(INFO_PATH, ChainSnapshot::from_payload(&payload))
    }

    /// Block looked up by height or hash
    pub async fn block_by_id(&self, id: &BlockId) -> Result<BlockRecord, Unavailable> {
        let path = block_path(id);
        let payload = self.resolver.resolve(&path).await?;
        extract(&path, BlockRecord::from_payload(id.clone(), &payload))
    }

    /// Block at the current tip
    pub async fn latest_block(&self) -> Result<BlockRecord, Unavailable> {
        let snapshot = self.current_snapshot().await?;
        self.block_by_id(&BlockId::Height(snapshot.block_height))
            .await
    }

    /// Difficulty one retarget period before the tip
    pub async fn previous_difficulty(&self) -> Result<f64, Unavailable> {
        let snapshot = self.current_snapshot().await?;
        self.period_start(&snapshot).await.map(|block| block.difficulty)
    }

    /// Percent change from the previous period's difficulty to the current one
    pub async fn previous_difficulty_change(&self) -> error::Result<f64> {
        let snapshot = self.current_snapshot().await?;
        let previous = self.period_start(&snapshot).await?;
        Ok(percent_difficulty_change(
            previous.difficulty,
            snapshot.difficulty,
        )?)
    }

    /// Percent change from the current difficulty to the one implied by the
    /// three-day hash rate estimate
    pub async fn estimated_difficulty_change(&self) -> error::Result<f64> {
        let snapshot = self.current_snapshot().await?;
        let next = estimated_next_difficulty(self.nethash_estimate().await?)?;
        Ok(percent_difficulty_change(snapshot.difficulty, next)?)
    }

    async fn period_start(&self, snapshot: &ChainSnapshot) -> Result<BlockRecord, Unavailable> {
        let height = snapshot
            .block_height
            .saturating_sub(DIFFICULTY_UPDATE_INTERVAL);
        self.block_by_id(&BlockId::Height(height)).await
    }

    /// Three-day network hash rate estimate in GH/s
    pub async fn nethash_estimate(&self) -> Result<f64, Unavailable> {
        match &self.nethash {
            Some(source) => source.estimate().await,
            None => {
                debug!("no hash rate estimate source configured");
                Err(Unavailable)
            }
        }
    }
}

fn extract<T>(path: &str, result: Result<T, FetchError>) -> Result<T, Unavailable> {
    result.map_err(|e| {
        debug!("{path}: {e}");
        Unavailable
    })
}
