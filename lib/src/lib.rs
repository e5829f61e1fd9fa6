pub mod error;
pub mod estimate;
pub mod metrics;
pub mod nethash;
pub mod resolver;
pub mod source;
pub mod validate;

use std::time::Duration;

pub use error::{DomainError, StatsError, Unavailable};
pub use metrics::{BlockId, BlockRecord, ChainMetrics, ChainSnapshot};
pub use resolver::Resolver;
pub use source::{ClientConfig, DataSource, HttpSource};

/// Initial block subsidy in bitcoin
pub const INITIAL_REWARD: f64 = 50.0;
/// Halving interval in blocks
pub const HALVING_INTERVAL: u64 = 210_000;
/// Nominal block interval in seconds
pub const IDEAL_BLOCK_TIME: u64 = 600;
/// Difficulty retarget period in blocks
pub const DIFFICULTY_UPDATE_INTERVAL: u64 = 2016;
/// Hard limit on a single remote request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Public chain explorer queried when nothing else is configured
pub const DEFAULT_SOURCE: &str = "https://chain.so";
/// Plain-text three-day network hash rate estimate, in GH/s
pub const DEFAULT_NETHASH_URL: &str = "http://bitcoin.sipa.be/speed-3D.txt";
/// Multiplier turning the three-day GH/s estimate into a difficulty.
///
/// Empirically fitted; it sits close to `600 * 1e9 / 2^32` (about 139.698)
/// but was never derived from it. Recalibrate against observed retargets
/// before relying on more than the first couple of digits.
pub const NETHASH_DIFFICULTY_FACTOR: f64 = 139.696254564;

pub const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;
pub const SECONDS_PER_DAY: f64 = 24.0 * SECONDS_PER_HOUR;
