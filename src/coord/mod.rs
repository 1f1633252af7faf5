use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Trait for types that carry a geographic latitude/longitude in degrees.
///
/// Implemented for `(f64, f64)` tuples read as `(lat, lon)`, for
/// `geo_types::Point<f64>` read as `x = lon, y = lat`, and for [`GeoRecord`].
/// This allows functions to accept any of them.
pub trait GeoCoord {
    /// Returns the latitude in degrees.
    fn lat(&self) -> f64;
    /// Returns the longitude in degrees.
    fn lon(&self) -> f64;
}

impl GeoCoord for (f64, f64) {
    fn lat(&self) -> f64 {
        self.0
    }
    fn lon(&self) -> f64 {
        self.1
    }
}

impl GeoCoord for Point<f64> {
    fn lat(&self) -> f64 {
        self.y()
    }
    fn lon(&self) -> f64 {
        self.x()
    }
}

impl GeoCoord for GeoRecord {
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Labeled geographic pair used when a point crosses a serialization boundary.
///
/// Serializes as `{"lat": <float>, "lon": <float>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub lat: f64,
    pub lon: f64,
}

impl From<(f64, f64)> for GeoRecord {
    fn from(geo: (f64, f64)) -> Self {
        geo_to_record(&geo)
    }
}

impl From<GeoRecord> for (f64, f64) {
    fn from(record: GeoRecord) -> Self {
        (record.lat, record.lon)
    }
}

impl From<GeoRecord> for Point<f64> {
    fn from(record: GeoRecord) -> Self {
        Point::new(record.lon, record.lat)
    }
}

/// Converts any geographic coordinate to its labeled form.
pub fn geo_to_record<C: GeoCoord>(geo: &C) -> GeoRecord {
    GeoRecord {
        lat: geo.lat(),
        lon: geo.lon(),
    }
}
