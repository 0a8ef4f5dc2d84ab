//! Selection engine: weighted random choice over the eligible subset
//!
//! Each candidate occupies `pool_count` slots of a virtual pool and one slot
//! is drawn uniformly, so P(candidate) = count / total. The pool is walked as
//! a cumulative sum rather than materialised.
//!
//! # Weighting strategies
//!
//! - [`ByWeight`]: count = weight (any candidate)
//! - [`ByCombinedScore`]: count = max(round(score * 10), 1), where score blends
//!   proximity (70%) with learned weight (30%). Places only.

use crate::types::{Candidate, Place};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance at or beyond which proximity contributes nothing (meters)
pub const MAX_DISTANCE_CAP: f64 = 50_000.0;

/// Weight treated as "fully liked" by the combined score
pub const MAX_WEIGHT_CAP: f64 = 10.0;

const DISTANCE_SHARE: f64 = 0.7;
const WEIGHT_SHARE: f64 = 0.3;
const SCORE_SCALE: f64 = 10.0;

/// Which weighting the place session draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Weight-proportional
    #[default]
    Uniform,
    /// Proximity blended with weight
    CombinedScore,
}

/// Number of virtual pool slots a candidate occupies
pub trait PoolWeighting<T> {
    fn pool_count(&self, candidate: &T) -> u64;
}

/// Pool count equal to the candidate weight
#[derive(Debug, Clone, Copy, Default)]
pub struct ByWeight;

impl<T: Candidate> PoolWeighting<T> for ByWeight {
    fn pool_count(&self, candidate: &T) -> u64 {
        candidate.weight().get().max(1) as u64
    }
}

/// Pool count derived from [`combined_score`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ByCombinedScore;

impl PoolWeighting<Place> for ByCombinedScore {
    fn pool_count(&self, place: &Place) -> u64 {
        // No upper bound: large weights make large pools
        ((combined_score(place) * SCORE_SCALE).round() as u64).max(1)
    }
}

/// Blend of proximity and learned preference
///
/// `0.7 * (1 - min(distance, 50km) / 50km) + 0.3 * (weight / 10)`
pub fn combined_score(place: &Place) -> f64 {
    let distance = place.distance.max(0.0).min(MAX_DISTANCE_CAP);
    let proximity = 1.0 - distance / MAX_DISTANCE_CAP;
    let preference = place.weight.get() as f64 / MAX_WEIGHT_CAP;
    DISTANCE_SHARE * proximity + WEIGHT_SHARE * preference
}

/// Weighted random picker with an injectable random source
pub struct SelectionEngine {
    rng: Box<dyn RngCore + Send>,
}

impl SelectionEngine {
    /// Engine seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible engine
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Draw one candidate, weight-proportionally
    pub fn decide<'a, T: Candidate>(&mut self, eligible: &[&'a T]) -> Option<&'a T> {
        self.decide_with(eligible, &ByWeight)
    }

    /// Draw one candidate using the given weighting
    ///
    /// Returns `None` iff `eligible` is empty. The result is always one of the
    /// inputs; nothing is mutated.
    pub fn decide_with<'a, T, W>(&mut self, eligible: &[&'a T], weighting: &W) -> Option<&'a T>
    where
        W: PoolWeighting<T>,
    {
        if eligible.is_empty() {
            return None;
        }

        let counts: Vec<u64> = eligible
            .iter()
            .map(|c| weighting.pool_count(c).max(1))
            .collect();
        let total = counts
            .iter()
            .fold(0u64, |acc, &count| acc.saturating_add(count));

        let mut ticket = self.rng.gen_range(0..total);
        for (candidate, count) in eligible.iter().zip(&counts) {
            if ticket < *count {
                debug!(
                    "Drew slot from pool of {} ({} candidates)",
                    total,
                    eligible.len()
                );
                return Some(*candidate);
            }
            ticket -= count;
        }

        // Only reachable if the total saturated
        eligible.last().copied()
    }

    /// Draw using the configured place weighting
    pub fn decide_place<'a>(
        &mut self,
        eligible: &[&'a Place],
        mode: SelectionMode,
    ) -> Option<&'a Place> {
        match mode {
            SelectionMode::Uniform => self.decide_with(eligible, &ByWeight),
            SelectionMode::CombinedScore => self.decide_with(eligible, &ByCombinedScore),
        }
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine").finish_non_exhaustive()
    }
}
