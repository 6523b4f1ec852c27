//! Randomized run scheduling - swap counts, inter-step delays, step labels,
//! and base-asset trade sizing

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use crate::shared::types::RunParams;

/// Draw the number of swaps for one wallet, uniform over
/// `[swaps_min, swaps_max]` inclusive.
pub fn draw_swap_count<R: Rng + ?Sized>(params: &RunParams, rng: &mut R) -> u32 {
    rng.gen_range(params.swaps_min..=params.swaps_max)
}

/// Draw one inter-step delay, uniform over `[delay_min_ms, delay_max_ms]`
/// inclusive.
pub fn draw_delay<R: Rng + ?Sized>(params: &RunParams, rng: &mut R) -> Duration {
    Duration::from_millis(rng.gen_range(params.delay_min_ms..=params.delay_max_ms))
}

/// Step labels `1..=count` in shuffled order.
///
/// The permutation only decorates the log lines; steps are otherwise
/// identical and always execute sequentially.
pub fn shuffled_steps<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Vec<u32> {
    let mut steps: Vec<u32> = (1..=count).collect();
    steps.shuffle(rng);
    steps
}

/// Size a base-asset trade: `min(floor(balance * fraction),
/// balance - fee_reserve)`, saturating at zero when the balance cannot even
/// cover the reserve.
pub fn base_trade_amount(balance: u64, fraction: f64, fee_reserve: u64) -> u64 {
    let by_fraction = (balance as f64 * fraction) as u64;
    by_fraction.min(balance.saturating_sub(fee_reserve))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(swaps: (u32, u32), delay: (u64, u64)) -> RunParams {
        RunParams {
            swaps_min: swaps.0,
            swaps_max: swaps.1,
            delay_min_ms: delay.0,
            delay_max_ms: delay.1,
            base_fraction: 0.9,
        }
    }

    #[test]
    fn test_swap_count_within_range_inclusive() {
        let p = params((5, 10), (1, 2));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let n = draw_swap_count(&p, &mut rng);
            assert!((5..=10).contains(&n));
            seen_min |= n == 5;
            seen_max |= n == 10;
        }
        // Both endpoints are reachable
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_delay_within_range_inclusive() {
        let p = params((1, 1), (30, 60));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let d = draw_delay(&p, &mut rng);
            assert!(d >= Duration::from_millis(30) && d <= Duration::from_millis(60));
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let p = params((7, 7), (100, 100));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw_swap_count(&p, &mut rng), 7);
        assert_eq!(draw_delay(&p, &mut rng), Duration::from_millis(100));
    }

    #[test]
    fn test_shuffled_steps_is_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut steps = shuffled_steps(20, &mut rng);
        assert_eq!(steps.len(), 20);
        steps.sort_unstable();
        assert_eq!(steps, (1..=20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_base_trade_amount_fraction_bound() {
        // 2 SOL at 90% with a 10k reserve: the fraction is the tighter bound
        assert_eq!(
            base_trade_amount(2_000_000_000, 0.9, 10_000),
            1_800_000_000
        );
    }

    #[test]
    fn test_base_trade_amount_reserve_bound() {
        // Tiny balance: the fee reserve is the tighter bound
        assert_eq!(base_trade_amount(100_000, 0.99, 10_000), 90_000);
    }

    #[test]
    fn test_base_trade_amount_saturates_at_zero() {
        assert_eq!(base_trade_amount(5_000, 0.9, 10_000), 0);
        assert_eq!(base_trade_amount(0, 0.9, 10_000), 0);
    }
}
