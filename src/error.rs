/// Error type for quadkey-rs operations.
#[derive(Debug, Clone, PartialEq)]
pub enum QuadKeyError {
    /// The quadkey string is empty, longer than 23 digits, or has a digit outside 0-3.
    InvalidKey(String),
    /// The geographic point is outside latitude [-90, 90] or longitude [-180, 180].
    InvalidCoordinate { lat: f64, lon: f64 },
    /// The level is outside the valid range (1-23).
    InvalidLevel(u8),
    /// File I/O error.
    IoError(String),
    /// CSV parsing or writing error.
    CsvError(String),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    GeometryParseError(String),
}

impl std::fmt::Display for QuadKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuadKeyError::InvalidKey(key) => write!(f, "Invalid quadkey: '{}'", key),
            QuadKeyError::InvalidCoordinate { lat, lon } => {
                write!(f, "Invalid coordinate: lat {}, lon {}", lat, lon)
            }
            QuadKeyError::InvalidLevel(level) => write!(f, "Invalid level: {}", level),
            QuadKeyError::IoError(msg) => write!(f, "IO error: {}", msg),
            QuadKeyError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            QuadKeyError::GeometryParseError(msg) => write!(f, "Geometry parse error: {}", msg),
        }
    }
}

impl std::error::Error for QuadKeyError {}
