//! Immutable discrete probability distribution over real-valued outcomes
//!
//! A `Distribution` stores its support as `(outcome, probability)` pairs in
//! ascending outcome order with unique, finite outcomes. It is built once by a
//! pure fold over its input pairs and never mutated afterwards, which is what
//! makes it safe to use as a hash key and to share across rayon workers.

use crate::accuracy::AccuracyParameters;
use crate::error::{EngineError, Result};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Tolerance on the total probability mass accepted by constructors.
pub const MASS_TOLERANCE: f64 = 1e-6;

/// Read access shared by every discrete distribution over `f64` outcomes.
pub trait DiscreteDistribution {
    /// Support in ascending outcome order.
    fn support(&self) -> &[(f64, f64)];

    /// Probability of an exact outcome (0.0 when absent).
    fn probability_of(&self, outcome: f64) -> f64 {
        let support = self.support();
        match support.binary_search_by(|(x, _)| x.total_cmp(&canonical(outcome))) {
            Ok(idx) => support[idx].1,
            Err(_) => 0.0,
        }
    }

    /// Outcomes in ascending order.
    fn outcomes(&self) -> Vec<f64> {
        self.support().iter().map(|&(x, _)| x).collect()
    }

    fn len(&self) -> usize {
        self.support().len()
    }

    fn is_empty(&self) -> bool {
        self.support().is_empty()
    }

    fn support_min(&self) -> f64 {
        self.support().first().map(|&(x, _)| x).unwrap_or(f64::NAN)
    }

    fn support_max(&self) -> f64 {
        self.support().last().map(|&(x, _)| x).unwrap_or(f64::NAN)
    }

    /// `(outcome, P(X <= outcome))` at every support point.
    fn cumulative(&self) -> Vec<(f64, f64)> {
        let mut total = 0.0;
        self.support()
            .iter()
            .map(|&(x, p)| {
                total += p;
                (x, total)
            })
            .collect()
    }
}

/// Maps `-0.0` to `0.0` so that equal outcomes share one bit pattern.
#[inline]
fn canonical(x: f64) -> f64 {
    x + 0.0
}

/// Running group used while coalescing sorted outcomes.
struct Group {
    anchor: f64,
    mass: f64,
    moment: f64,
    merged: bool,
}

impl Group {
    fn new(x: f64, p: f64) -> Self {
        Group { anchor: x, mass: p, moment: x * p, merged: false }
    }

    fn outcome(&self) -> f64 {
        if self.merged && self.mass > 0.0 {
            canonical(self.moment / self.mass)
        } else {
            self.anchor
        }
    }
}

/// Immutable probability mass function over `f64` outcomes.
#[derive(Debug, Clone)]
pub struct Distribution {
    support: Vec<(f64, f64)>,
}

impl Distribution {
    /// Single outcome with probability 1.
    pub fn point(outcome: f64) -> Result<Self> {
        if !outcome.is_finite() {
            return Err(EngineError::NonFiniteOutcome(outcome));
        }
        Ok(Distribution { support: vec![(canonical(outcome), 1.0)] })
    }

    /// Build from arbitrary `(outcome, probability)` pairs.
    ///
    /// Duplicate outcomes are summed, outcomes within the coalescing tolerance
    /// merge, low-mass outcomes are pruned and the result is renormalized.
    /// The input mass must sum to 1 within [`MASS_TOLERANCE`].
    pub fn from_pairs<I>(pairs: I, params: &AccuracyParameters) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut raw: Vec<(f64, f64)> = Vec::new();
        for (outcome, probability) in pairs {
            if !outcome.is_finite() {
                return Err(EngineError::NonFiniteOutcome(outcome));
            }
            if !probability.is_finite() || probability < 0.0 {
                return Err(EngineError::InvalidProbability { outcome, probability });
            }
            raw.push((canonical(outcome), probability));
        }
        if raw.is_empty() {
            return Err(EngineError::EmptyDistribution);
        }
        let total: f64 = raw.iter().map(|&(_, p)| p).sum();
        if (total - 1.0).abs() > MASS_TOLERANCE {
            return Err(EngineError::MassNotConserved(total));
        }
        raw.sort_by(|a, b| a.0.total_cmp(&b.0));

        let tolerance = params.coalescing_tolerance;
        let groups = raw.into_iter().fold(Vec::<Group>::new(), |mut groups, (x, p)| {
            match groups.last_mut() {
                Some(g) if x - g.anchor <= tolerance => {
                    g.merged |= x != g.anchor;
                    g.mass += p;
                    g.moment += x * p;
                }
                _ => groups.push(Group::new(x, p)),
            }
            groups
        });

        let floor = params.probability_floor;
        let mut support: Vec<(f64, f64)> = groups
            .iter()
            .filter(|g| g.mass > 0.0 && g.mass > floor)
            .map(|g| (g.outcome(), g.mass))
            .collect();
        if support.is_empty() {
            return Err(EngineError::EmptyDistribution);
        }

        if let Some(max) = params.max_outcomes {
            bound_support(&mut support, max);
        }

        let retained: f64 = support.iter().map(|&(_, p)| p).sum();
        for entry in support.iter_mut() {
            entry.1 /= retained;
        }
        Ok(Distribution { support })
    }

    /// Expectation `Σ outcome · probability`.
    pub fn mean(&self) -> f64 {
        self.support.iter().map(|&(x, p)| x * p).sum()
    }
}

/// Merge the closest adjacent pair (mean-preserving) until `len <= max`.
fn bound_support(support: &mut Vec<(f64, f64)>, max: usize) {
    while support.len() > max.max(1) {
        let idx = (0..support.len() - 1)
            .min_by(|&i, &j| {
                let gi = support[i + 1].0 - support[i].0;
                let gj = support[j + 1].0 - support[j].0;
                gi.partial_cmp(&gj).unwrap_or(Ordering::Equal)
            })
            .unwrap_or(0);
        let (x1, p1) = support[idx];
        let (x2, p2) = support.remove(idx + 1);
        let mass = p1 + p2;
        support[idx] = (canonical((x1 * p1 + x2 * p2) / mass), mass);
    }
}

impl DiscreteDistribution for Distribution {
    fn support(&self) -> &[(f64, f64)] {
        &self.support
    }
}

impl PartialEq for Distribution {
    fn eq(&self, other: &Self) -> bool {
        self.support.len() == other.support.len()
            && self
                .support
                .iter()
                .zip(other.support.iter())
                .all(|(a, b)| a.0.to_bits() == b.0.to_bits() && a.1.to_bits() == b.1.to_bits())
    }
}

impl Eq for Distribution {}

impl Hash for Distribution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.support.len().hash(state);
        for (x, p) in &self.support {
            x.to_bits().hash(state);
            p.to_bits().hash(state);
        }
    }
}
