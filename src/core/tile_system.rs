//! Fixed Web Mercator transform pipeline: geographic <-> pixel <-> tile <-> quadkey.
//!
//! Geographic points are `(lat, lon)` pairs in degrees, pixels and tiles are
//! `(x, y)` pairs. Every function is pure. Level arguments are part of the
//! caller's contract and are asserted, never clipped.

use crate::core::constants::{
    EARTH_RADIUS, MAX_LATITUDE, MAX_LEVEL, MAX_LONGITUDE, MIN_LATITUDE, MIN_LEVEL, MIN_LONGITUDE,
    TILE_SIZE,
};
use geo_types::{Rect, coord};
use std::f64::consts::PI;

/// Clamps `value` into `[min, max]`.
#[inline]
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Returns true if `level` is within 1-23.
#[inline]
pub fn valid_level(level: u8) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}

/// Returns true if `key` has 1-23 characters, each of them one of `0`, `1`, `2`, `3`.
pub fn valid_key(key: &str) -> bool {
    (MIN_LEVEL as usize..=MAX_LEVEL as usize).contains(&key.len())
        && key.chars().all(|c| matches!(c, '0'..='3'))
}

/// Returns true if latitude is within [-90, 90] and longitude within [-180, 180].
pub fn valid_geo(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
}

/// Width and height of the whole map in pixels at `level`.
#[inline]
pub fn map_size(level: u8) -> u32 {
    assert!(valid_level(level), "level {} out of range", level);
    TILE_SIZE << level
}

/// Meters represented by one pixel at `latitude` and `level`.
///
/// Latitude is clipped to [-90, 90]; the value collapses to zero at the poles.
pub fn ground_resolution(latitude: f64, level: u8) -> f64 {
    let latitude = clip(latitude, -90.0, 90.0);
    (latitude * PI / 180.0).cos() * 2.0 * PI * EARTH_RADIUS / map_size(level) as f64
}

/// Projects a `(lat, lon)` point to pixel coordinates at `level`.
///
/// Latitude is clipped to the Mercator limits and longitude to [-180, 180], so
/// any input lands on the map.
pub fn geo_to_pixel(geo: (f64, f64), level: u8) -> (u32, u32) {
    let (lat, lon) = geo;
    let lat = clip(lat, MIN_LATITUDE, MAX_LATITUDE);
    let lon = clip(lon, MIN_LONGITUDE, MAX_LONGITUDE);

    let x = (lon + 180.0) / 360.0;
    let sin_lat = (lat * PI / 180.0).sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

    let size = map_size(level) as f64;
    let px = clip(x * size + 0.5, 0.0, size - 1.0);
    let py = clip(y * size + 0.5, 0.0, size - 1.0);

    (px as u32, py as u32)
}

/// Inverse of [`geo_to_pixel`]; returns `(lat, lon)` of the pixel's corner.
pub fn pixel_to_geo(pixel: (u32, u32), level: u8) -> (f64, f64) {
    let size = map_size(level) as f64;
    let x = clip(pixel.0 as f64, 0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - clip(pixel.1 as f64, 0.0, size - 1.0) / size;

    let lat = 90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI;
    let lon = 360.0 * x;

    (lat, lon)
}

/// Tile containing the given pixel.
#[inline]
pub fn pixel_to_tile(pixel: (u32, u32)) -> (u32, u32) {
    (pixel.0 / TILE_SIZE, pixel.1 / TILE_SIZE)
}

/// Pixel at the tile's upper-left corner, or at its center when `centered`.
#[inline]
pub fn tile_to_pixel(tile: (u32, u32), centered: bool) -> (u32, u32) {
    let offset = if centered { TILE_SIZE / 2 } else { 0 };
    (tile.0 * TILE_SIZE + offset, tile.1 * TILE_SIZE + offset)
}

/// Encodes a tile as a quadkey of exactly `level` digits.
///
/// Digits run from the most significant bit down; tile Y contributes the
/// high bit of each digit. Bits at or above `level` are ignored.
pub fn tile_to_quadkey(tile: (u32, u32), level: u8) -> String {
    assert!(valid_level(level), "level {} out of range", level);
    let (tile_x, tile_y) = tile;
    let mut key = String::with_capacity(level as usize);

    for i in (1..=level).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = b'0';
        if tile_x & mask != 0 {
            digit += 1;
        }
        if tile_y & mask != 0 {
            digit += 2;
        }
        key.push(digit as char);
    }

    key
}

/// Decodes a quadkey into its tile and level.
pub fn quadkey_to_tile(key: &str) -> ((u32, u32), u8) {
    assert!(valid_key(key), "invalid quadkey '{}'", key);
    let mut tile_x = 0u32;
    let mut tile_y = 0u32;

    for c in key.chars() {
        tile_x <<= 1;
        tile_y <<= 1;
        match c {
            '1' => tile_x |= 1,
            '2' => tile_y |= 1,
            '3' => {
                tile_x |= 1;
                tile_y |= 1;
            }
            _ => {}
        }
    }

    ((tile_x, tile_y), key.len() as u8)
}

/// Geographic extent of a tile, with `x` as longitude and `y` as latitude.
///
/// Edges come straight from the inverse Mercator, so the east and south edges
/// are exact rather than one pixel short.
pub fn tile_bounds(tile: (u32, u32), level: u8) -> Rect<f64> {
    assert!(valid_level(level), "level {} out of range", level);
    let n = (1u64 << level) as f64;

    let lon_at = |x: f64| x / n * 360.0 - 180.0;
    let lat_at = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();

    let west = lon_at(tile.0 as f64);
    let east = lon_at(tile.0 as f64 + 1.0);
    let north = lat_at(tile.1 as f64);
    let south = lat_at(tile.1 as f64 + 1.0);

    Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north })
}
