//! # quadkey-rs
//!
//! Quadkeys address tiles of the Web Mercator map as strings of base-4 digits,
//! one digit per zoom level. There are currently three main entry points.
//!
//! ### 1. `QuadKey` - Single Tile Operations
//!
//! ```
//! use quadkey_rs::QuadKey;
//!
//! # fn main() -> Result<(), quadkey_rs::QuadKeyError> {
//! let qk = QuadKey::from_geo(&(51.5074, -0.1278), 12)?;
//! println!("{} at level {}", qk, qk.level());
//!
//! let parent = qk.parent()?;
//! assert_eq!(qk.is_ancestor(&parent), Some(1));
//! assert_eq!(qk.unwind().len(), 12);
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `core` - The Tile System
//!
//! ```
//! use quadkey_rs::core::{geo_to_pixel, pixel_to_tile, tile_to_quadkey, quadkey_to_tile};
//!
//! let tile = pixel_to_tile(geo_to_pixel((0.0, 0.0), 4));
//! let key = tile_to_quadkey(tile, 4);
//! assert_eq!(key, "3000");
//! assert_eq!(quadkey_to_tile(&key), (tile, 4));
//! ```
//!
//! ### 3. `CsvToQuadKey` - CSV File Conversion
//!
//! ```no_run
//! use quadkey_rs::{CsvQuadKeyConfig, CsvToQuadKey, GeometryFormat};
//!
//! let config = CsvQuadKeyConfig::new("geometry", 14)
//!     .with_tile_geometry(GeometryFormat::GeoJson);
//!
//! "input.csv".to_quadkey_csv("output.csv", &config).unwrap();
//! ```
//!

pub mod coord;
pub mod core;
pub mod error;
pub mod geom;
pub mod io;
pub mod quadkey;

pub use self::coord::{GeoCoord, GeoRecord, geo_to_record};
pub use self::core::{
    EARTH_RADIUS, MAX_LATITUDE, MAX_LEVEL, MAX_LONGITUDE, MIN_LATITUDE, MIN_LEVEL, MIN_LONGITUDE,
    TILE_SIZE, valid_geo, valid_key, valid_level,
};
pub use error::QuadKeyError;
pub use geom::{GeometryFormat, format_polygon, parse_geometry};
pub use io::{CoordinateSource, CsvQuadKeyConfig, CsvToQuadKey, csv_to_quadkey_csv};
pub use quadkey::{Difference, Orientation, QuadKey, from_geo, from_str, from_tile};

pub use geo_types;
