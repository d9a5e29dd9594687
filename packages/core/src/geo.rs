//! Great-circle distance between search points and provider locations.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build from a GeoJSON `[longitude, latitude]` pair. Feeds sometimes
    /// carry `null` entries, so both leading values must be present.
    pub fn from_geojson(position: &[Option<f64>]) -> Option<Self> {
        match position {
            [Some(longitude), Some(latitude), ..] => Some(Self::new(*latitude, *longitude)),
            _ => None,
        }
    }
}

/// Haversine distance in miles on a sphere of the mean Earth radius.
///
/// At search-radius scales this stays within 0.5% of the WGS-84 geodesic
/// distance, so a location sitting within that margin of the radius edge
/// may fall on either side of it.
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}
