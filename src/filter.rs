//! Filter engine: derives the eligible subset from a full collection
//!
//! Filters are pure predicates and are re-applied on every access. Bounds are
//! validated at the setter, so the predicates only ever see sane values.

use crate::types::{DecisionOption, Place};
use std::collections::BTreeSet;

/// Eligibility predicate over one candidate kind
pub trait CandidateFilter<T> {
    fn accepts(&self, candidate: &T) -> bool;

    /// Eligible candidates in collection order
    fn apply<'a>(&self, candidates: &'a [T]) -> Vec<&'a T> {
        candidates.iter().filter(|c| self.accepts(c)).collect()
    }
}

/// Tag membership filter for options
///
/// Empty selection admits everything. Otherwise an option is eligible when it
/// carries at least one selected tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    selected: BTreeSet<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.selected.contains(tag)
    }

    /// Flip a tag in or out of the selection; returns whether it is now selected
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.selected.remove(tag) {
            false
        } else {
            self.selected.insert(tag.to_string());
            true
        }
    }

    pub fn select(&mut self, tag: impl Into<String>) {
        self.selected.insert(tag.into());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

impl CandidateFilter<DecisionOption> for TagFilter {
    fn accepts(&self, option: &DecisionOption) -> bool {
        self.selected.is_empty() || option.tags.iter().any(|t| self.selected.contains(t))
    }
}

/// Sorted, de-duplicated tags across all options
pub fn all_tags(options: &[DecisionOption]) -> Vec<String> {
    options
        .iter()
        .flat_map(|o| o.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rating floor and distance ceiling for places, both inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceFilter {
    min_rating: f64,
    max_distance: f64,
}

impl PlaceFilter {
    pub const MAX_RATING: f64 = 5.0;

    /// Build a filter, falling back to the permissive bound for invalid input
    pub fn new(min_rating: f64, max_distance: f64) -> Self {
        let mut filter = Self::default();
        filter.set_min_rating(min_rating);
        filter.set_max_distance(max_distance);
        filter
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Accepts finite ratings in [0, 5]; otherwise keeps the previous floor
    pub fn set_min_rating(&mut self, min_rating: f64) -> bool {
        if min_rating.is_finite() && (0.0..=Self::MAX_RATING).contains(&min_rating) {
            self.min_rating = min_rating;
            true
        } else {
            false
        }
    }

    /// Accepts finite positive distances; otherwise keeps the previous ceiling
    pub fn set_max_distance(&mut self, max_distance: f64) -> bool {
        if max_distance.is_finite() && max_distance > 0.0 {
            self.max_distance = max_distance;
            true
        } else {
            false
        }
    }
}

impl Default for PlaceFilter {
    fn default() -> Self {
        Self {
            min_rating: 0.0,
            max_distance: 5000.0,
        }
    }
}

impl CandidateFilter<Place> for PlaceFilter {
    fn accepts(&self, place: &Place) -> bool {
        place.rating >= self.min_rating && place.distance <= self.max_distance
    }
}
