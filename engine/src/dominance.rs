//! Approximate first-order stochastic dominance between reward distributions.

use crate::distribution::DiscreteDistribution;
use crate::reward::RewardDistribution;

/// Slack allowed when comparing cumulative masses.
pub const DOMINANCE_TOLERANCE: f64 = 1e-6;

/// Whether `r1` strongly dominates `r2`.
///
/// Equal distributions never dominate each other. Otherwise the union of both
/// supports is scanned in ascending order while tracking, per side, the mass
/// covered so far and the last outcome seen on that side. Dominance fails as
/// soon as `r1`'s last outcome is below `r2`'s or `r1`'s covered mass exceeds
/// `r2`'s by more than [`DOMINANCE_TOLERANCE`].
pub fn is_strongly_dominating(r1: &RewardDistribution, r2: &RewardDistribution) -> bool {
    if r1 == r2 {
        return false;
    }
    let (s1, s2) = (r1.support(), r2.support());
    let (mut i, mut j) = (0usize, 0usize);
    let mut last1 = r1.support_min();
    let mut last2 = r2.support_min();
    let mut covered1 = 0.0_f64;
    let mut covered2 = 0.0_f64;

    while i < s1.len() || j < s2.len() {
        let next = match (s1.get(i), s2.get(j)) {
            (Some(a), Some(b)) => a.0.min(b.0),
            (Some(a), None) => a.0,
            (None, Some(b)) => b.0,
            (None, None) => break,
        };
        if let Some(&(x, p)) = s1.get(i).filter(|(x, _)| *x == next) {
            covered1 += p;
            last1 = x;
            i += 1;
        }
        if let Some(&(x, p)) = s2.get(j).filter(|(x, _)| *x == next) {
            covered2 += p;
            last2 = x;
            j += 1;
        }
        if last1 < last2 {
            return false;
        }
        if covered1 > covered2 + DOMINANCE_TOLERANCE {
            return false;
        }
    }
    true
}

/// Members of `candidates` not strongly dominated by any other member.
///
/// Input order is preserved; equal candidates are kept once.
pub fn non_dominated(candidates: Vec<RewardDistribution>) -> Vec<RewardDistribution> {
    let distinct = crate::merge::dedup_preserving_order(candidates);
    distinct
        .iter()
        .filter(|c| !distinct.iter().any(|other| is_strongly_dominating(other, c)))
        .cloned()
        .collect()
}
