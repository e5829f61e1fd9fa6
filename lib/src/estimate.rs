//! Closed-form Bitcoin estimators.
//!
//! Everything here is pure: no I/O, no shared state. Inputs outside the
//! documented domain (non-positive difficulty or hash rate, negative
//! interval, non-finite values) produce a [`DomainError`].

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::validate::{check_non_negative, check_positive};
use crate::{
    HALVING_INTERVAL, IDEAL_BLOCK_TIME, INITIAL_REWARD, NETHASH_DIFFICULTY_FACTOR,
    SECONDS_PER_DAY, SECONDS_PER_HOUR,
};

/// Expected number of hashes per unit of difficulty (2^48 / 65535)
const HASHES_PER_DIFFICULTY: f64 = 281_474_976_710_656.0 / 65_535.0;
/// 2^32, the per-difficulty divisor of the Poisson approximation
const TWO_POW_32: f64 = 4_294_967_296.0;
const HASHES_PER_TERAHASH: f64 = 1e12;

/// Expected coin output for a given hash rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRate {
    pub per_day: f64,
    pub per_hour: f64,
}

/// Distance to the next subsidy halving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalvingCountdown {
    pub halving_height: u64,
    pub blocks_remaining: u64,
    /// `blocks_remaining` at the nominal ten-minute spacing
    pub seconds_remaining: u64,
}

/// Number of halvings that took place up to `height`
pub fn halvings(height: u64) -> u64 {
    height / HALVING_INTERVAL
}

/// Block subsidy in bitcoin at `height`
pub fn block_subsidy(height: u64) -> f64 {
    era_subsidy(halvings(height))
}

fn era_subsidy(era: u64) -> f64 {
    // 0.5^i32::MAX is already zero, no need to go further
    let era = i32::try_from(era).unwrap_or(i32::MAX);
    INITIAL_REWARD * 0.5f64.powi(era)
}

/// Average seconds needed to find a block with `hashrate_thps` tera-hashes
/// per second at `difficulty`
pub fn expected_generation_time(hashrate_thps: f64, difficulty: f64) -> Result<f64, DomainError> {
    let hashrate_thps = check_positive("hash rate", hashrate_thps)?;
    let difficulty = check_positive("difficulty", difficulty)?;

    Ok(HASHES_PER_DIFFICULTY * difficulty / hashrate_thps / HASHES_PER_TERAHASH)
}

/// Expected bitcoin generated per day and per hour, using the subsidy in
/// force at `height`
pub fn expected_generation_rate(
    hashrate_thps: f64,
    difficulty: f64,
    height: u64,
) -> Result<GenerationRate, DomainError> {
    let gentime = expected_generation_time(hashrate_thps, difficulty)?;
    let subsidy = block_subsidy(height);

    Ok(GenerationRate {
        per_day: subsidy * SECONDS_PER_DAY / gentime,
        per_hour: subsidy * SECONDS_PER_HOUR / gentime,
    })
}

/// Probability of finding at least one block within `interval_s` seconds
pub fn generation_probability(
    hashrate_hps: f64,
    interval_s: f64,
    difficulty: f64,
) -> Result<f64, DomainError> {
    let exponent = poisson_exponent(hashrate_hps, interval_s, difficulty)?;
    // 1 - e^-x without losing the small-probability digits
    Ok(-(-exponent).exp_m1())
}

fn poisson_exponent(hashrate_hps: f64, interval_s: f64, difficulty: f64) -> Result<f64, DomainError> {
    let hashrate_hps = check_positive("hash rate", hashrate_hps)?;
    let interval_s = check_non_negative("interval", interval_s)?;
    let difficulty = check_positive("difficulty", difficulty)?;

    Ok(hashrate_hps * interval_s / (TWO_POW_32 * difficulty))
}

/// Expected seconds between blocks that each take at least `min_interval_s`
/// to be found.
///
/// Grows without bound as `min_interval_s` grows; for intervals far beyond
/// the generation time the result is `f64::INFINITY`.
pub fn expected_spacing_for_min_interval(
    hashrate_hps: f64,
    difficulty: f64,
    min_interval_s: f64,
) -> Result<f64, DomainError> {
    let exponent = poisson_exponent(hashrate_hps, min_interval_s, difficulty)?;
    let gentime = expected_generation_time(hashrate_hps / HASHES_PER_TERAHASH, difficulty)?;

    // gentime / (1 - p) where 1 - p = e^-x
    Ok(gentime * exponent.exp())
}

/// Next halving strictly above `height`.
///
/// Heights in the last era below `u64::MAX` have no representable next
/// halving and yield [`DomainError::NoNextHalving`].
pub fn halving_countdown(height: u64) -> Result<HalvingCountdown, DomainError> {
    let halving_height = (halvings(height) + 1)
        .checked_mul(HALVING_INTERVAL)
        .ok_or(DomainError::NoNextHalving { height })?;
    let blocks_remaining = halving_height - height;

    Ok(HalvingCountdown {
        halving_height,
        blocks_remaining,
        seconds_remaining: blocks_remaining * IDEAL_BLOCK_TIME,
    })
}

/// Total bitcoin issued once the block at `height` has been mined
pub fn total_mined(height: u64) -> f64 {
    // the genesis block counts too
    let blocks = height.saturating_add(1);
    let completed_eras = (blocks - 1) / HALVING_INTERVAL;
    let partial_blocks = blocks - completed_eras * HALVING_INTERVAL;

    // geometric series: sum of INITIAL_REWARD / 2^i for i < completed_eras
    let completed = HALVING_INTERVAL as f64
        * 2.0
        * (INITIAL_REWARD - era_subsidy(completed_eras));

    completed + partial_blocks as f64 * era_subsidy(completed_eras)
}

/// Percent change from `prev_difficulty` to `curr_difficulty`, rounded to
/// five decimal places
pub fn percent_difficulty_change(
    prev_difficulty: f64,
    curr_difficulty: f64,
) -> Result<f64, DomainError> {
    let prev = check_positive("previous difficulty", prev_difficulty)?;
    let curr = check_positive("difficulty", curr_difficulty)?;

    Ok(round_to(100.0 * (curr / prev - 1.0), 5))
}

/// Difficulty implied by a network hash rate estimate in GH/s
pub fn estimated_next_difficulty(nethash_ghps: f64) -> Result<f64, DomainError> {
    let nethash_ghps = check_positive("network hash rate", nethash_ghps)?;
    Ok(nethash_ghps * NETHASH_DIFFICULTY_FACTOR)
}

/// Whole seconds elapsed from `then` to `now`, zero if `then` lies ahead
pub fn seconds_since(then: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - then).num_seconds()).unwrap_or(0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
