//! Feedback engine: accept/reject adjusts a single candidate's weight
//!
//! Liked adds one, disliked subtracts one, and the result is clamped to the
//! floor of 1 so every candidate keeps a non-zero chance indefinitely.

use crate::types::{Candidate, Weight};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// User verdict on the most recent selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Liked,
    Disliked,
}

impl Feedback {
    pub fn is_liked(self) -> bool {
        matches!(self, Feedback::Liked)
    }
}

impl From<bool> for Feedback {
    fn from(liked: bool) -> Self {
        if liked {
            Feedback::Liked
        } else {
            Feedback::Disliked
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Liked => write!(f, "liked"),
            Feedback::Disliked => write!(f, "disliked"),
        }
    }
}

/// Applies feedback to candidates held in a collection
pub struct FeedbackEngine;

impl FeedbackEngine {
    /// Adjust the weight of the candidate identified by `key`
    ///
    /// Returns the new weight, or `None` when no candidate has that key; in
    /// that case the collection is left untouched.
    pub fn apply<T: Candidate>(
        candidates: &mut [T],
        key: &T::Key,
        feedback: Feedback,
    ) -> Option<Weight> {
        let candidate = candidates.iter_mut().find(|c| &c.key() == key)?;
        let weight = candidate.weight().adjust(feedback);
        candidate.set_weight(weight);
        debug!("Feedback {} on {} -> weight {}", feedback, key, weight);
        Some(weight)
    }
}
