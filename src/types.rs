//! Core data types for the decision engine
//!
//! Every decidable item is a weighted candidate. Three concrete variants exist:
//! [`DecisionOption`] (tag-bearing list entries), [`Place`] (spatial search
//! results) and [`ImageMark`] (positions tapped on an image). They share the
//! [`Candidate`] trait so selection and feedback work the same for all of them.

use crate::feedback::Feedback;
use crate::geo;
use crate::providers::SearchHit;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Relative selection preference, never below 1
///
/// Persisted as a plain integer. Values below 1 coming from storage are
/// clamped on the way in, so a `Weight` in memory always satisfies the floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "i64")]
pub struct Weight(u32);

impl Weight {
    /// The floor every weight is clamped to
    pub const MIN: Weight = Weight(1);

    /// Create a weight, clamping to the floor
    pub fn new(value: u32) -> Self {
        Self(value.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Weight after one round of feedback
    pub fn adjust(self, feedback: Feedback) -> Self {
        match feedback {
            Feedback::Liked => Self(self.0.saturating_add(1)),
            Feedback::Disliked => Self::new(self.0.saturating_sub(1)),
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i64> for Weight {
    fn from(value: i64) -> Self {
        Self::new(value.clamp(1, u32::MAX as i64) as u32)
    }
}

impl From<Weight> for i64 {
    fn from(weight: Weight) -> Self {
        weight.0 as i64
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for candidates
///
/// Wraps a UUID so candidate ids cannot be mixed up with other identifiers.
/// Assigned at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    /// Create a new random candidate ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a candidate ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared behaviour of every weighted candidate
pub trait Candidate: Clone {
    /// Stable identity used to find the candidate again for feedback
    type Key: Clone + PartialEq + fmt::Debug + fmt::Display;

    fn key(&self) -> Self::Key;

    fn label(&self) -> &str;

    fn weight(&self) -> Weight;

    fn set_weight(&mut self, weight: Weight);
}

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Point in source-image coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A user-entered option (e.g. a food choice) with free-form tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: CandidateId,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub weight: Weight,
}

impl DecisionOption {
    /// New option with the default weight
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: CandidateId::new(),
            name: name.into(),
            tags,
            weight: Weight::MIN,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Weight::new(weight);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Candidate for DecisionOption {
    type Key = CandidateId;

    fn key(&self) -> CandidateId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> Weight {
        self.weight
    }

    fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }
}

/// A nearby place returned by a search
///
/// `id` is ephemeral per search. `place_id` is the durable key that weight
/// history is stored under and merged back from on later searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: CandidateId,
    pub name: String,
    /// Meters from the search origin
    pub distance: f64,
    /// 0 to 5
    pub rating: f64,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
    #[serde(default)]
    pub weight: Weight,
}

impl Place {
    pub fn new(
        name: impl Into<String>,
        distance: f64,
        rating: f64,
        position: Coordinate,
        place_id: impl Into<String>,
    ) -> Self {
        Self {
            id: CandidateId::new(),
            name: name.into(),
            distance,
            rating,
            lat: position.lat,
            lng: position.lng,
            place_id: place_id.into(),
            weight: Weight::MIN,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Weight::new(weight);
        self
    }

    /// Build a fresh place from a search hit, measured from `origin`
    pub fn from_hit(hit: &SearchHit, origin: Coordinate, weight: Weight) -> Self {
        let position = Coordinate::new(hit.lat, hit.lng);
        let mut place = Self::new(
            hit.name.clone(),
            geo::distance_meters(position, origin),
            hit.rating.unwrap_or(0.0),
            position,
            hit.external_id.clone(),
        );
        place.weight = weight;
        place
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

impl Candidate for Place {
    type Key = String;

    fn key(&self) -> String {
        self.place_id.clone()
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> Weight {
        self.weight
    }

    fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }
}

/// A numbered mark tapped on an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMark {
    pub id: CandidateId,
    /// Display sequence number (1, 2, 3, ...)
    pub numeric_id: u32,
    pub display_name: String,
    pub position: Point,
    #[serde(default)]
    pub weight: Weight,
}

impl ImageMark {
    pub fn new(numeric_id: u32, position: Point) -> Self {
        Self {
            id: CandidateId::new(),
            numeric_id,
            display_name: format!("Mark {}", numeric_id),
            position,
            weight: Weight::MIN,
        }
    }
}

impl Candidate for ImageMark {
    type Key = CandidateId;

    fn key(&self) -> CandidateId {
        self.id
    }

    fn label(&self) -> &str {
        &self.display_name
    }

    fn weight(&self) -> Weight {
        self.weight
    }

    fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }
}
