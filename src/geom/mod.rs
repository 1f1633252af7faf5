//! Geometry text formats accepted and produced at the CSV boundary.

use crate::error::QuadKeyError;
use geo_types::{Geometry, Polygon};
use geojson::GeoJson;
use std::str::FromStr;
use wkt::{ToWkt, Wkt};

/// Text encoding for geometry columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text, e.g. `POLYGON((...))`
    Wkt,
    /// GeoJSON geometry object
    GeoJson,
}

/// Parses a geometry string. A leading `{` selects GeoJSON, anything else is read as WKT.
pub fn parse_geometry(s: &str) -> Result<Geometry<f64>, QuadKeyError> {
    let trimmed = s.trim();
    if trimmed.starts_with('{') {
        parse_geojson(trimmed)
    } else {
        parse_wkt(trimmed)
    }
}

/// Parses a GeoJSON geometry or single feature.
pub fn parse_geojson(s: &str) -> Result<Geometry<f64>, QuadKeyError> {
    let geojson: GeoJson = s
        .parse()
        .map_err(|e: geojson::Error| QuadKeyError::GeometryParseError(e.to_string()))?;

    let geometry = match geojson {
        GeoJson::Geometry(geom) => geom,
        GeoJson::Feature(feature) => feature.geometry.ok_or_else(|| {
            QuadKeyError::GeometryParseError("Feature has no geometry".to_string())
        })?,
        GeoJson::FeatureCollection(_) => {
            return Err(QuadKeyError::GeometryParseError(
                "FeatureCollection not supported".to_string(),
            ));
        }
    };

    Geometry::try_from(geometry).map_err(|e| QuadKeyError::GeometryParseError(e.to_string()))
}

/// Parses a WKT geometry.
pub fn parse_wkt(s: &str) -> Result<Geometry<f64>, QuadKeyError> {
    let wkt: Wkt<f64> =
        Wkt::from_str(s).map_err(|e| QuadKeyError::GeometryParseError(e.to_string()))?;

    wkt.try_into().map_err(|_| {
        QuadKeyError::GeometryParseError("Failed to convert WKT to geometry".to_string())
    })
}

/// Renders a polygon in the requested format.
pub fn format_polygon(polygon: &Polygon<f64>, format: GeometryFormat) -> String {
    match format {
        GeometryFormat::Wkt => polygon.wkt_string(),
        GeometryFormat::GeoJson => geojson::Geometry::from(polygon).to_string(),
    }
}
