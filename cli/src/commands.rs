//! Turns a parsed [`Query`] into a reply line.

use anyhow::{Context, Result};
use btcdata::estimate::{
    block_subsidy, estimated_next_difficulty, expected_generation_rate, expected_generation_time,
    expected_spacing_for_min_interval, generation_probability, halving_countdown, seconds_since,
    total_mined,
};
use btcdata::ChainMetrics;
use chrono::Utc;

use crate::cli::Query;
use crate::format::{time_elapsed, utc_after};

const HASHES_PER_TERAHASH: f64 = 1e12;
const HASHES_PER_GIGAHASH: f64 = 1e9;

/// Difficulty supplied by the user, or the live one
async fn difficulty_or_current(metrics: &ChainMetrics, difficulty: Option<f64>) -> Result<f64> {
    if let Some(difficulty) = difficulty {
        return Ok(difficulty);
    }
    let snapshot = metrics.current_snapshot().await.context(
        "Failed to fetch current difficulty. Try again later or supply difficulty manually",
    )?;
    Ok(snapshot.difficulty)
}

pub async fn run(query: Query, metrics: &ChainMetrics) -> Result<String> {
    let reply = match query {
        Query::Blocks => metrics.current_snapshot().await?.block_height.to_string(),
        Query::Diff => metrics.current_snapshot().await?.difficulty.to_string(),
        Query::Blockdiff { block } => metrics.block_by_id(&block).await?.difficulty.to_string(),
        Query::Bounty => {
            let snapshot = metrics.current_snapshot().await?;
            block_subsidy(snapshot.block_height).to_string()
        }
        Query::Gentime {
            hashrate,
            difficulty,
        } => {
            let difficulty = difficulty_or_current(metrics, difficulty).await?;
            let gentime = expected_generation_time(hashrate, difficulty)?;
            format!(
                "The average time to generate a block at {hashrate} Thps, given difficulty of {difficulty}, is {}",
                time_elapsed(gentime)
            )
        }
        Query::Genrate {
            hashrate,
            difficulty,
        } => {
            let snapshot = metrics
                .current_snapshot()
                .await
                .context("Failed to retrieve current block bounty")?;
            let difficulty = difficulty.unwrap_or(snapshot.difficulty);
            let rate = expected_generation_rate(hashrate, difficulty, snapshot.block_height)?;
            format!(
                "The expected generation output, at {hashrate} Thps, given difficulty of {difficulty}, is {} BTC per day and {} BTC per hour.",
                rate.per_day, rate.per_hour
            )
        }
        Query::Genprob {
            hashrate,
            interval,
            difficulty,
        } => {
            let difficulty = difficulty_or_current(metrics, difficulty).await?;
            let probability =
                generation_probability(hashrate * HASHES_PER_TERAHASH, interval, difficulty)?;
            format!(
                "The probability to generate a block at {hashrate} Thps within {}, given difficulty of {difficulty}, is {probability}",
                time_elapsed(interval)
            )
        }
        Query::Tblb { interval } => {
            let (snapshot, nethash) =
                tokio::join!(metrics.current_snapshot(), metrics.nethash_estimate());
            let spacing = expected_spacing_for_min_interval(
                nethash? * HASHES_PER_GIGAHASH,
                snapshot?.difficulty,
                interval,
            )?;
            format!(
                "The expected time between blocks taking {} to generate is {}",
                time_elapsed(interval),
                time_elapsed(spacing)
            )
        }
        Query::Tslb => {
            let block = metrics
                .latest_block()
                .await
                .context("Problem retrieving latest block data")?;
            format!(
                "Time since last block: {}",
                time_elapsed(seconds_since(block.timestamp, Utc::now()) as f64)
            )
        }
        Query::Nethash => {
            let snapshot = metrics.current_snapshot().await?;
            (snapshot.network_hashrate / HASHES_PER_TERAHASH).to_string()
        }
        Query::Diffchange => {
            let change = metrics.estimated_difficulty_change().await?;
            format!(
                "Estimated percent change in difficulty this period {change} % based on data for last three days"
            )
        }
        Query::Estimate => {
            let next = estimated_next_difficulty(metrics.nethash_estimate().await?)?;
            format!("Next difficulty estimate {next} based on data for last three days")
        }
        Query::Totalbc => {
            let snapshot = metrics
                .current_snapshot()
                .await
                .context("Failed to retrieve block count")?;
            total_mined(snapshot.block_height).to_string()
        }
        Query::Halfreward => {
            let snapshot = metrics
                .current_snapshot()
                .await
                .context("Failed to retrieve block count")?;
            let countdown = halving_countdown(snapshot.block_height)?;
            format!(
                "Estimated time of bitcoin block reward halving: {} UTC | Time remaining: {}.",
                utc_after(Utc::now(), countdown.seconds_remaining),
                time_elapsed(countdown.seconds_remaining as f64)
            )
        }
        Query::Prevdiff => metrics.previous_difficulty().await?.to_string(),
        Query::Prevdiffchange => metrics.previous_difficulty_change().await?.to_string(),
    };

    Ok(reply)
}
