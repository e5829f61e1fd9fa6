use std::path::PathBuf;

use btcdata::metrics::BlockId;
use btcdata::validate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Path to config file
    #[arg(short, long, value_name = "FILE", default_value = "btcstats.toml")]
    pub config: PathBuf,
    /// Chain explorer base URL, tried in the order given (overrides config)
    #[arg(short, long = "source", value_name = "URL")]
    pub sources: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate config template
    GenerateConfig {
        /// Path to the produced file
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    #[command(flatten)]
    Query(Query),
}

/// A single line typed in interactive mode
#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub query: Query,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Query {
    /// Current block count
    Blocks,
    /// Current difficulty
    Diff,
    /// Difficulty of a block given by number or hash
    Blockdiff {
        #[arg(value_name = "BLOCK")]
        block: BlockId,
    },
    /// Current block subsidy
    Bounty,
    /// Expected time to generate a block with <HASHRATE> Thps
    Gentime {
        #[arg(value_parser = hashrate)]
        hashrate: f64,
        /// Defaults to the current difficulty
        #[arg(value_parser = difficulty)]
        difficulty: Option<f64>,
    },
    /// Expected bitcoin generation rate with <HASHRATE> Thps
    Genrate {
        #[arg(value_parser = hashrate)]
        hashrate: f64,
        /// Defaults to the current difficulty
        #[arg(value_parser = difficulty)]
        difficulty: Option<f64>,
    },
    /// Probability to generate a block with <HASHRATE> Thps within <INTERVAL> seconds
    Genprob {
        #[arg(value_parser = hashrate)]
        hashrate: f64,
        #[arg(value_parser = interval)]
        interval: f64,
        /// Defaults to the current difficulty
        #[arg(value_parser = difficulty)]
        difficulty: Option<f64>,
    },
    /// Expected time between blocks which take at least <INTERVAL> seconds to create
    Tblb {
        #[arg(value_parser = interval)]
        interval: f64,
    },
    /// Time elapsed since the latest block
    Tslb,
    /// Current network hash rate in Thps
    Nethash,
    /// Estimated percent difficulty change this period
    Diffchange,
    /// Next difficulty estimate
    Estimate,
    /// Total number of bitcoins created so far
    Totalbc,
    /// Estimated time of the next subsidy halving
    Halfreward,
    /// Previous difficulty level
    Prevdiff,
    /// Percent change from previous to current difficulty
    Prevdiffchange,
}

fn hashrate(s: &str) -> Result<f64, btcdata::DomainError> {
    validate::positive_float("hash rate", s)
}

fn difficulty(s: &str) -> Result<f64, btcdata::DomainError> {
    validate::positive_float("difficulty", s)
}

fn interval(s: &str) -> Result<f64, btcdata::DomainError> {
    validate::non_negative_float("interval", s)
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(args: &[&str]) -> Result<Query, clap::Error> {
        Line::try_parse_from(args).map(|line| line.query)
    }

    #[test]
    fn optional_difficulty_may_be_left_out() {
        assert_eq!(
            line(&["gentime", "150"]).unwrap(),
            Query::Gentime {
                hashrate: 150.0,
                difficulty: None
            }
        );
        assert_eq!(
            line(&["genprob", "150", "600", "8e13"]).unwrap(),
            Query::Genprob {
                hashrate: 150.0,
                interval: 600.0,
                difficulty: Some(8e13)
            }
        );
    }

    #[test]
    fn invalid_numbers_are_rejected_before_estimation() {
        assert!(line(&["gentime", "0"]).is_err());
        assert!(line(&["gentime", "-5"]).is_err());
        assert!(line(&["genrate", "10", "lots"]).is_err());
        assert!(line(&["tblb", "-600"]).is_err());
    }

    #[test]
    fn blockdiff_accepts_height_or_hash() {
        assert_eq!(
            line(&["blockdiff", "840000"]).unwrap(),
            Query::Blockdiff {
                block: BlockId::Height(840_000)
            }
        );
        assert!(matches!(
            line(&["blockdiff", "0000000000000000000320283a032748"]).unwrap(),
            Query::Blockdiff {
                block: BlockId::Hash(_)
            }
        ));
    }

    #[test]
    fn queries_are_top_level_subcommands() {
        let cli = Cli::try_parse_from(["btcstats", "-s", "https://a", "-s", "https://b", "totalbc"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Query(Query::Totalbc))));
        assert_eq!(cli.sources, ["https://a", "https://b"]);
    }
}
