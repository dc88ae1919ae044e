//! Property-based tests for the reward-distribution algebra.

use proptest::prelude::*;

use riskdist_engine::dominance::is_strongly_dominating;
use riskdist_engine::merge::{cartesian_product, weighted_merge};
use riskdist_engine::truncate::truncate_upper_tail;
use riskdist_engine::{AccuracyParameters, DiscreteDistribution, RewardDistribution};

const EXACT: AccuracyParameters = AccuracyParameters::EXACT;

/// Strategy: a distribution over up to 8 integer outcomes in [-20, 20].
fn distribution_strategy() -> impl Strategy<Value = RewardDistribution> {
    prop::collection::vec((-20i32..=20, 1u32..=100), 1..8).prop_map(|raw| {
        let total: u32 = raw.iter().map(|&(_, w)| w).sum();
        let pairs = raw.into_iter().map(|(x, w)| (x as f64, w as f64 / total as f64));
        RewardDistribution::from_pairs(pairs, &EXACT).unwrap()
    })
}

fn total_mass(d: &RewardDistribution) -> f64 {
    d.support().iter().map(|&(_, p)| p).sum()
}

proptest! {
    // 1. Every constructed distribution conserves probability mass
    #[test]
    fn mass_is_conserved(d in distribution_strategy(), shift in -50i32..50) {
        prop_assert!((total_mass(&d) - 1.0).abs() < 1e-9);
        let shifted = d.shift(shift as f64, &EXACT).unwrap();
        prop_assert!((total_mass(&shifted) - 1.0).abs() < 1e-9);
    }

    // 2. Shift moves every outcome and keeps its probability
    #[test]
    fn shift_moves_outcomes(d in distribution_strategy(), shift in -50i32..50) {
        let c = shift as f64;
        let shifted = d.shift(c, &EXACT).unwrap();
        prop_assert_eq!(shifted.len(), d.len());
        for &(x, p) in d.support() {
            prop_assert!((shifted.probability_of(x + c) - p).abs() < 1e-12);
        }
        prop_assert!((shifted.average_reward() - d.average_reward() - c).abs() < 1e-9);
    }

    // 3. A single-branch mixture is the branch itself
    #[test]
    fn single_branch_mixture(d in distribution_strategy(), w in 0.01f64..10.0) {
        let m = RewardDistribution::mixture(vec![(&d, w)], &EXACT).unwrap();
        for &(x, p) in d.support() {
            prop_assert!((m.probability_of(x) - p).abs() < 1e-12);
        }
    }

    // 4. Truncating nothing returns the input
    #[test]
    fn truncate_zero_is_identity(d in distribution_strategy()) {
        let t = truncate_upper_tail(&d, 0.0, &EXACT).unwrap();
        for &(x, p) in d.support() {
            prop_assert!((t.probability_of(x) - p).abs() < 1e-9);
        }
    }

    // 5. Average after truncation is non-increasing in the removed fraction
    #[test]
    fn truncation_is_monotone(d in distribution_strategy(), a in 0.0f64..0.95, b in 0.0f64..0.95) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let avg_lo = truncate_upper_tail(&d, lo, &EXACT).unwrap().average_reward();
        let avg_hi = truncate_upper_tail(&d, hi, &EXACT).unwrap().average_reward();
        prop_assert!(
            avg_hi <= avg_lo + 1e-9,
            "lo={} hi={} avg_lo={} avg_hi={}",
            lo,
            hi,
            avg_lo,
            avg_hi
        );
    }

    // 6. Dominance is irreflexive and antisymmetric (up to the mass tolerance)
    #[test]
    fn dominance_is_a_strict_order(d in distribution_strategy(), e in distribution_strategy()) {
        prop_assert!(!is_strongly_dominating(&d, &d));
        if (d.average_reward() - e.average_reward()).abs() > 1e-9 {
            prop_assert!(!(is_strongly_dominating(&d, &e) && is_strongly_dominating(&e, &d)));
        }
    }

    // 7. Cartesian product of distinct elements has the full size
    #[test]
    fn cartesian_product_size(m in 1usize..6, n in 1usize..6) {
        let left: Vec<usize> = (0..m).collect();
        let right: Vec<usize> = (0..n).collect();
        prop_assert_eq!(cartesian_product(&[left, right]).unwrap().len(), m * n);
    }

    // 8. Merged results are at most the product of the dimension sizes
    #[test]
    fn merge_result_is_bounded(
        first in prop::collection::vec(distribution_strategy(), 1..4),
        second in prop::collection::vec(distribution_strategy(), 1..4),
    ) {
        let bound = first.len() * second.len();
        let merged = weighted_merge(&[(first, 0.5), (second, 0.5)], 1.0, &EXACT).unwrap();
        prop_assert!(!merged.is_empty() && merged.len() <= bound);
        for d in &merged {
            prop_assert!((total_mass(d) - 1.0).abs() < 1e-9);
        }
    }
}
