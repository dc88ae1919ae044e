//! Combinatorial merge of independently weighted candidate sets
//!
//! Each dimension contributes a set of candidate reward distributions and a
//! weight. One candidate is picked per dimension (cartesian product), the picks
//! are mixed by dimension weight, the extra scalar reward is added, and equal
//! results are coalesced. Cost is the product of the dimension sizes.
//!
//! Tuples are independent, so they are merged in parallel with Rayon; the
//! inputs are only borrowed immutably.

use crate::accuracy::AccuracyParameters;
use crate::error::{EngineError, Result};
use crate::reward::RewardDistribution;
use rayon::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// All tuples picking exactly one element from every dimension.
///
/// Duplicate tuples are coalesced, so the result holds at most the product of
/// the dimension sizes. A single dimension yields one tuple per element rather
/// than the whole list as one tuple, so a one-dimension merge returns each
/// candidate shifted instead of their mixture. Zero dimensions is an error.
pub fn cartesian_product<V: Clone + Eq + Hash>(dimensions: &[Vec<V>]) -> Result<Vec<Vec<V>>> {
    if dimensions.is_empty() {
        return Err(EngineError::NoDimensions);
    }
    let mut tuples: Vec<Vec<V>> = vec![Vec::with_capacity(dimensions.len())];
    for dimension in dimensions {
        tuples = tuples
            .iter()
            .flat_map(|prefix| {
                dimension.iter().map(move |v| {
                    let mut tuple = prefix.clone();
                    tuple.push(v.clone());
                    tuple
                })
            })
            .collect();
    }
    Ok(dedup_preserving_order(tuples))
}

pub(crate) fn dedup_preserving_order<V: Clone + Eq + Hash>(items: Vec<V>) -> Vec<V> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// Every distinct distribution obtained by picking one candidate per
/// dimension, mixing the picks by dimension weight and shifting by `extra`.
///
/// When the same distribution is picked by several dimensions their weights
/// accumulate into one mixture branch.
pub fn weighted_merge(
    dimensions: &[(Vec<RewardDistribution>, f64)],
    extra: f64,
    params: &AccuracyParameters,
) -> Result<Vec<RewardDistribution>> {
    if dimensions.is_empty() {
        return Err(EngineError::NoDimensions);
    }
    if let Some(idx) = dimensions.iter().position(|(candidates, _)| candidates.is_empty()) {
        return Err(EngineError::EmptyDimension(idx));
    }

    let index_sets: Vec<Vec<usize>> = dimensions
        .iter()
        .map(|(candidates, _)| (0..candidates.len()).collect())
        .collect();
    let tuples = cartesian_product(&index_sets)?;

    let merged: Vec<RewardDistribution> = tuples
        .par_iter()
        .map(|picks| {
            let branches = picks.iter().enumerate().fold(
                Vec::<(&RewardDistribution, f64)>::with_capacity(picks.len()),
                |mut acc, (dim, &pick)| {
                    let (candidates, weight) = &dimensions[dim];
                    let picked = &candidates[pick];
                    match acc.iter_mut().find(|(d, _)| *d == picked) {
                        Some(entry) => entry.1 += *weight,
                        None => acc.push((picked, *weight)),
                    }
                    acc
                },
            );
            RewardDistribution::mixture(branches, params)?.shift(extra, params)
        })
        .collect::<Result<Vec<_>>>()?;

    let distinct = dedup_preserving_order(merged);
    debug!(
        dimensions = dimensions.len(),
        tuples = tuples.len(),
        distinct = distinct.len(),
        "weighted merge"
    );
    Ok(distinct)
}
