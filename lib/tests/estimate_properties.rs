//! Property tests for the estimators.

use btcdata::estimate::{
    block_subsidy, expected_generation_time, generation_probability, halving_countdown,
    total_mined,
};
use btcdata::HALVING_INTERVAL;
use proptest::prelude::*;

fn positive() -> impl Strategy<Value = f64> {
    1e-3f64..1e15
}

proptest! {
    #[test]
    fn subsidy_follows_halving_formula(height in 0u64..50_000_000) {
        let expected = 50.0 / 2f64.powi((height / HALVING_INTERVAL) as i32);
        prop_assert_eq!(block_subsidy(height), expected);
    }

    #[test]
    fn subsidy_halves_exactly_at_boundary(era in 1u64..64) {
        let boundary = era * HALVING_INTERVAL;
        prop_assert_eq!(block_subsidy(boundary), block_subsidy(boundary - 1) / 2.0);
    }

    #[test]
    fn probability_grows_with_interval(
        hashrate in positive(), difficulty in positive(),
        t1 in 0f64..1e6, dt in 0f64..1e6,
    ) {
        let p1 = generation_probability(hashrate, t1, difficulty).unwrap();
        let p2 = generation_probability(hashrate, t1 + dt, difficulty).unwrap();
        prop_assert!(p2 >= p1);
        prop_assert!((0.0..=1.0).contains(&p2));
    }

    #[test]
    fn probability_grows_with_hashrate(
        h1 in positive(), factor in 1f64..1e3,
        interval in 0f64..1e6, difficulty in positive(),
    ) {
        let p1 = generation_probability(h1, interval, difficulty).unwrap();
        let p2 = generation_probability(h1 * factor, interval, difficulty).unwrap();
        prop_assert!(p2 >= p1);
    }

    #[test]
    fn probability_shrinks_with_difficulty(
        hashrate in positive(), interval in 0f64..1e6,
        d1 in positive(), factor in 1f64..1e3,
    ) {
        let p1 = generation_probability(hashrate, interval, d1).unwrap();
        let p2 = generation_probability(hashrate, interval, d1 * factor).unwrap();
        prop_assert!(p2 <= p1);
    }

    #[test]
    fn generation_time_is_strictly_monotonic(
        hashrate in positive(), difficulty in positive(), factor in 1.001f64..1e3,
    ) {
        let base = expected_generation_time(hashrate, difficulty).unwrap();
        prop_assert!(expected_generation_time(hashrate * factor, difficulty).unwrap() < base);
        prop_assert!(expected_generation_time(hashrate, difficulty * factor).unwrap() > base);
    }

    #[test]
    fn countdown_lands_on_next_boundary(height in 0u64..100_000_000) {
        let countdown = halving_countdown(height).unwrap();
        prop_assert!(countdown.halving_height > height);
        prop_assert_eq!(countdown.halving_height % HALVING_INTERVAL, 0);
        prop_assert!(countdown.blocks_remaining <= HALVING_INTERVAL);
        prop_assert_eq!(countdown.seconds_remaining, countdown.blocks_remaining * 600);
    }

    #[test]
    fn total_mined_increases_by_current_subsidy(height in 0u64..7_000_000) {
        let step = total_mined(height + 1) - total_mined(height);
        prop_assert!((step - block_subsidy(height + 1)).abs() < 1e-6);
    }
}
