use crate::coord::{GeoCoord, GeoRecord};
use crate::core::constants::{MAX_LEVEL, TILE_SIZE};
use crate::core::tile_system::{
    geo_to_pixel, ground_resolution, pixel_to_geo, pixel_to_tile, quadkey_to_tile, tile_bounds,
    tile_to_pixel, tile_to_quadkey, valid_geo, valid_key,
};
use crate::error::QuadKeyError;
use geo::BoundingRect;
use geo_types::{Geometry, Point, Polygon, Rect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Address of one tile in the quadtree over the Web Mercator map.
///
/// A quadkey is a string of 1-23 digits in `0..=3`; its length is the level.
/// The first `k` digits address the ancestor tile at level `k`. Equality and
/// ordering are those of the underlying string, so sorting quadkeys gives a
/// depth-first walk of the tree.
///
/// # Example
///
/// ```
/// use quadkey_rs::QuadKey;
///
/// # fn main() -> Result<(), quadkey_rs::QuadKeyError> {
/// let qk = QuadKey::from_geo(&(40.7128, -74.006), 12)?;
/// assert_eq!(qk.level(), 12);
///
/// let parent = qk.parent()?;
/// assert_eq!(qk.is_ancestor(&parent), Some(1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuadKey {
    key: String,
}

impl QuadKey {
    /// Create a QuadKey from its digit string.
    ///
    /// Fails with [`QuadKeyError::InvalidKey`] if the string is empty, longer
    /// than 23 characters, or contains anything but `0`-`3`.
    pub fn new(key: impl Into<String>) -> Result<Self, QuadKeyError> {
        let key = key.into();
        if !valid_key(&key) {
            return Err(QuadKeyError::InvalidKey(key));
        }
        Ok(Self { key })
    }

    /// Create the QuadKey of the tile containing a geographic point.
    ///
    /// Fails with [`QuadKeyError::InvalidCoordinate`] outside latitude [-90, 90]
    /// or longitude [-180, 180]. Latitudes beyond the Mercator limit are
    /// clipped onto the edge row. Panics if `level` is not within 1-23.
    ///
    /// # Example
    /// ```
    /// use quadkey_rs::QuadKey;
    /// use geo_types::Point;
    ///
    /// # fn main() -> Result<(), quadkey_rs::QuadKeyError> {
    /// // From a (lat, lon) tuple
    /// let qk = QuadKey::from_geo(&(0.0, 0.0), 4)?;
    /// assert_eq!(qk.key(), "3000");
    /// // From a Point (x = lon, y = lat)
    /// let qk = QuadKey::from_geo(&Point::new(0.0, 0.0), 4)?;
    /// assert_eq!(qk.key(), "3000");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_geo(geo: &impl GeoCoord, level: u8) -> Result<Self, QuadKeyError> {
        let (lat, lon) = (geo.lat(), geo.lon());
        if !valid_geo(lat, lon) {
            return Err(QuadKeyError::InvalidCoordinate { lat, lon });
        }
        let pixel = geo_to_pixel((lat, lon), level);
        Ok(Self::from_tile(pixel_to_tile(pixel), level))
    }

    /// Create the QuadKey of a tile. The tile is not range-checked; bits at or
    /// above `level` are dropped. Panics if `level` is not within 1-23.
    pub fn from_tile(tile: (u32, u32), level: u8) -> Self {
        Self {
            key: tile_to_quadkey(tile, level),
        }
    }

    /// QuadKeys for many points at one level, computed in parallel.
    ///
    /// Output order matches input order. Fails on the first invalid coordinate.
    pub fn from_geo_batch<C>(points: &[C], level: u8) -> Result<Vec<Self>, QuadKeyError>
    where
        C: GeoCoord + Sync,
    {
        points
            .par_iter()
            .map(|point| Self::from_geo(point, level))
            .collect()
    }

    /// Lazily walks the QuadKeys at `level` covering the bounding rectangle of a geometry.
    ///
    /// A point yields a single key. Geometries without a bounding rectangle
    /// (empty collections) give `None`.
    pub fn from_geometry_iter(
        geometry: &Geometry<f64>,
        level: u8,
    ) -> Result<Option<Difference>, QuadKeyError> {
        let Some(rect) = geometry.bounding_rect() else {
            log::warn!("Geometry has no bounding rectangle, no quadkeys produced");
            return Ok(None);
        };

        let north_west = Self::from_geo(&Point::new(rect.min().x, rect.max().y), level)?;
        let south_east = Self::from_geo(&Point::new(rect.max().x, rect.min().y), level)?;

        Ok(Some(north_west.difference_iter(&south_east)))
    }

    /// Collected form of [`QuadKey::from_geometry_iter`].
    pub fn from_geometry(geometry: &Geometry<f64>, level: u8) -> Result<Vec<Self>, QuadKeyError> {
        Ok(Self::from_geometry_iter(geometry, level)?
            .map(|walk| walk.collect())
            .unwrap_or_default())
    }

    /// The digit string.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Depth in the quadtree, equal to the number of digits.
    pub fn level(&self) -> u8 {
        self.key.len() as u8
    }

    /// The enclosing tile one level up.
    ///
    /// A level-1 key has no parent and yields [`QuadKeyError::InvalidKey`].
    pub fn parent(&self) -> Result<Self, QuadKeyError> {
        Self::new(&self.key[..self.key.len() - 1])
    }

    /// The four tiles one level down, in digit order. Empty at level 23.
    pub fn children(&self) -> Vec<Self> {
        if self.level() >= MAX_LEVEL {
            return Vec::new();
        }
        ['0', '1', '2', '3']
            .into_iter()
            .map(|digit| {
                let mut key = String::with_capacity(self.key.len() + 1);
                key.push_str(&self.key);
                key.push(digit);
                Self { key }
            })
            .collect()
    }

    /// If `other` is a strict ancestor of `self`, the number of levels between them.
    pub fn is_ancestor(&self, other: &QuadKey) -> Option<u8> {
        if self.level() <= other.level() || !self.key.starts_with(&other.key) {
            return None;
        }
        Some(self.level() - other.level())
    }

    /// If `other` is a strict descendant of `self`, the number of levels between them.
    pub fn is_descendant(&self, other: &QuadKey) -> Option<u8> {
        other.is_ancestor(self)
    }

    /// True if `other` is `self` or lies inside it.
    pub fn contains(&self, other: &QuadKey) -> bool {
        other.key.starts_with(&self.key)
    }

    /// `self` followed by each ancestor, deepest first, ending at level 1.
    pub fn unwind(&self) -> Vec<Self> {
        (1..=self.key.len())
            .rev()
            .map(|len| Self {
                key: self.key[..len].to_string(),
            })
            .collect()
    }

    /// The up-to-8 tiles surrounding this one at the same level.
    ///
    /// Neighbor tile coordinates are taken as `|x + dx|, |y + dy|`, so stepping
    /// off the west or north edge reflects back onto the grid, while stepping
    /// off the east or south edge wraps to column or row 0 through the
    /// quadkey encoding. The west-edge reflection does not model antimeridian
    /// wraparound. Results are deduplicated and sorted, so edge tiles get
    /// fewer than 8.
    pub fn nearby(&self) -> Vec<Self> {
        let ((tile_x, tile_y), level) = self.to_tile();

        let mut tiles = BTreeSet::new();
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = (tile_x as i64 + dx).unsigned_abs() as u32;
                let y = (tile_y as i64 + dy).unsigned_abs() as u32;
                tiles.insert((x, y));
            }
        }

        tiles
            .into_iter()
            .map(|tile| Self::from_tile(tile, level))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Edge length of the tile in meters, measured at the equator.
    pub fn side(&self) -> f64 {
        TILE_SIZE as f64 * ground_resolution(0.0, self.level())
    }

    /// Area of the tile in square meters, measured at the equator.
    pub fn area(&self) -> f64 {
        let side = self.side();
        side * side
    }

    /// Tile coordinates and level.
    pub fn to_tile(&self) -> ((u32, u32), u8) {
        quadkey_to_tile(&self.key)
    }

    /// `(lat, lon)` of the tile's north-west corner, or of its center when `centered`.
    pub fn to_geo(&self, centered: bool) -> (f64, f64) {
        let (tile, level) = self.to_tile();
        pixel_to_geo(tile_to_pixel(tile, centered), level)
    }

    /// Same as [`QuadKey::to_geo`] as a `Point` with `x = lon, y = lat`.
    pub fn to_point(&self, centered: bool) -> Point<f64> {
        let (lat, lon) = self.to_geo(centered);
        Point::new(lon, lat)
    }

    /// Same as [`QuadKey::to_geo`] as a labeled record.
    pub fn to_record(&self, centered: bool) -> GeoRecord {
        GeoRecord::from(self.to_geo(centered))
    }

    /// Geographic extent of the tile (`x` = lon, `y` = lat).
    pub fn bbox(&self) -> Rect<f64> {
        let (tile, level) = self.to_tile();
        tile_bounds(tile, level)
    }

    /// Converts the tile footprint to a closed polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.bbox().to_polygon()
    }

    /// Lazily walks every tile in the rectangle spanned by `self` and `other`.
    ///
    /// Both endpoints are included. Clone the iterator to restart it.
    ///
    /// # Panics
    ///
    /// If the two keys are at different levels.
    pub fn difference_iter(&self, other: &QuadKey) -> Difference {
        assert_eq!(
            self.level(),
            other.level(),
            "difference requires quadkeys of the same level"
        );
        let (from, level) = self.to_tile();
        let (to, _) = other.to_tile();
        Difference::new(from, to, level)
    }

    /// Collected form of [`QuadKey::difference_iter`].
    pub fn difference(&self, other: &QuadKey) -> Vec<Self> {
        self.difference_iter(other).collect()
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for QuadKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl FromStr for QuadKey {
    type Err = QuadKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for QuadKey {
    type Error = QuadKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for QuadKey {
    type Error = QuadKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuadKey> for String {
    fn from(qk: QuadKey) -> Self {
        qk.key
    }
}

/// Parses a quadkey string.
pub fn from_str(key: &str) -> Result<QuadKey, QuadKeyError> {
    QuadKey::new(key)
}

/// QuadKey of the tile containing `geo` at `level`.
pub fn from_geo(geo: &impl GeoCoord, level: u8) -> Result<QuadKey, QuadKeyError> {
    QuadKey::from_geo(geo, level)
}

/// QuadKey of `tile` at `level`.
pub fn from_tile(tile: (u32, u32), level: u8) -> QuadKey {
    QuadKey::from_tile(tile, level)
}

/// Relative placement of the two corners handed to [`QuadKey::difference_iter`].
///
/// Named `first/second`. Checked in declaration order, so ties on an axis
/// resolve to the earliest matching variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    NortheastSouthwest,
    SouthwestNortheast,
    NorthwestSoutheast,
    SoutheastNorthwest,
}

impl Orientation {
    fn classify(from: (u32, u32), to: (u32, u32)) -> Self {
        let (x, y) = (0, 1);
        let from = [from.0, from.1];
        let to = [to.0, to.1];

        if from[x] >= to[x] && from[y] <= to[y] {
            Orientation::NortheastSouthwest
        } else if from[x] <= to[x] && from[y] >= to[y] {
            Orientation::SouthwestNortheast
        } else if from[x] <= to[x] && from[y] <= to[y] {
            Orientation::NorthwestSoutheast
        } else {
            Orientation::SoutheastNorthwest
        }
    }

    /// Rows are walked from the north (smaller y) when the eastern corner is the northern one.
    fn rows_ascending(self) -> bool {
        matches!(
            self,
            Orientation::NortheastSouthwest | Orientation::SouthwestNortheast
        )
    }
}

/// Lazy walk over a rectangle of tiles, yielding QuadKeys.
///
/// Columns go from east to west. Within a column, rows go north to south or
/// south to north depending on the [`Orientation`].
#[derive(Debug, Clone)]
pub struct Difference {
    level: u8,
    orientation: Orientation,
    x_min: u32,
    y_min: u32,
    y_max: u32,
    next: Option<(u32, u32)>,
    remaining: u64,
}

impl Difference {
    fn new(from: (u32, u32), to: (u32, u32), level: u8) -> Self {
        let orientation = Orientation::classify(from, to);
        let (x_min, x_max) = (from.0.min(to.0), from.0.max(to.0));
        let (y_min, y_max) = (from.1.min(to.1), from.1.max(to.1));
        let remaining = (x_max - x_min + 1) as u64 * (y_max - y_min + 1) as u64;

        log::debug!(
            "Difference at level {} over x {}..={} y {}..={} ({:?}, {} tiles)",
            level,
            x_min,
            x_max,
            y_min,
            y_max,
            orientation,
            remaining
        );

        let mut walk = Self {
            level,
            orientation,
            x_min,
            y_min,
            y_max,
            next: None,
            remaining,
        };
        walk.next = Some((x_max, walk.row_start()));
        walk
    }

    /// Number of tiles not yet yielded. Exact on every target, unlike `len()`.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// How the two corners were classified.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn row_start(&self) -> u32 {
        if self.orientation.rows_ascending() {
            self.y_min
        } else {
            self.y_max
        }
    }

    fn step(&self, (x, y): (u32, u32)) -> Option<(u32, u32)> {
        let next_y = if self.orientation.rows_ascending() {
            (y < self.y_max).then(|| y + 1)
        } else {
            (y > self.y_min).then(|| y - 1)
        };

        match next_y {
            Some(y) => Some((x, y)),
            None if x > self.x_min => Some((x - 1, self.row_start())),
            None => None,
        }
    }
}

impl Iterator for Difference {
    type Item = QuadKey;

    fn next(&mut self) -> Option<Self::Item> {
        let tile = self.next?;
        self.next = self.step(tile);
        self.remaining -= 1;
        Some(QuadKey::from_tile(tile, self.level))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// `len()` panics when the remaining count does not fit in `usize`, which
/// only happens on 32-bit targets for rectangles past 2^32 tiles. Use
/// [`Difference::remaining`] there.
impl ExactSizeIterator for Difference {}

impl std::iter::FusedIterator for Difference {}
