use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

/// The remote data could not be obtained.
///
/// Timeouts, refused connections, bad envelopes and missing fields all end up
/// here; the remedy is the same for every one of them (try again later).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to retrieve data. Try again later.")]
pub struct Unavailable;

/// An estimator or validator was handed a value outside its domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("no halving is reachable after block height {height}")]
    NoNextHalving { height: u64 },
    #[error("Invalid {name}: '{input}' is not a number")]
    NotANumber { name: &'static str, input: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error(transparent)]
    Unavailable(#[from] Unavailable),
    #[error(transparent)]
    Domain(#[from] DomainError),
}
