//! Distance approximation for search results

use crate::types::Coordinate;

/// Meters per degree used by the flat-earth approximation
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Approximate distance in meters between two coordinates
///
/// Treats degrees of latitude and longitude as equal lengths. Good enough for
/// ranking places within a few kilometers; it does not wrap at the date line.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (a.lat - b.lat) * METERS_PER_DEGREE;
    let d_lng = (a.lng - b.lng) * METERS_PER_DEGREE;
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}
