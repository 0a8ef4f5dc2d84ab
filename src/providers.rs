//! External collaborators consumed by the place session
//!
//! Search and detail lookups are asynchronous and may fail; the session treats
//! every failure as an empty result. Location is a plain optional fix.

use crate::error::Result;
use crate::types::Coordinate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters of one nearby search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    pub origin: Coordinate,
    pub radius_meters: u32,
}

/// One raw search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Durable external key (e.g. a maps place id)
    pub external_id: String,
}

/// Extended information about a single place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePhoto {
    pub photo_reference: String,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: u8,
    pub text: String,
    /// Unix seconds
    pub time: i64,
}

/// Nearby place search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}

/// Place detail lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceDetailProvider: Send + Sync {
    async fn fetch_details(&self, external_id: &str) -> Result<Option<PlaceDetail>>;
}

/// Source of the user's current position
#[cfg_attr(test, mockall::automock)]
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> Option<Coordinate>;
}

/// Location provider that always reports the same fix (or none)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Option<Coordinate> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_tolerates_missing_fields() {
        let detail: PlaceDetail = serde_json::from_str(r#"{"name": "Corner Cafe"}"#).unwrap();
        assert_eq!(detail.name, "Corner Cafe");
        assert!(detail.opening_hours.is_none());
        assert!(detail.reviews.is_empty());
    }

    #[test]
    fn test_hit_rating_optional() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"name": "Bistro", "lat": 43.6, "lng": -79.4, "external_id": "b-1"}"#,
        )
        .unwrap();
        assert!(hit.rating.is_none());
    }

    #[test]
    fn test_fixed_location() {
        assert!(FixedLocation(None).current_location().is_none());
        let here = Coordinate::new(1.0, 2.0);
        assert_eq!(FixedLocation(Some(here)).current_location(), Some(here));
    }
}
