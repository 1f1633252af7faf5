/// Equatorial radius of the Earth in meters (WGS84 semi-major axis)
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude bounds of the square Mercator map
pub const MIN_LATITUDE: f64 = -85.05112878;
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Longitude bounds of the map
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Shallowest level; a quadkey has at least one digit
pub const MIN_LEVEL: u8 = 1;

/// Deepest level; a quadkey has at most 23 digits
pub const MAX_LEVEL: u8 = 23;

/// Edge length of a tile in pixels
pub const TILE_SIZE: u32 = 256;
