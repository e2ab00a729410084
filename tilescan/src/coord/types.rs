//! Coordinate type definitions

use std::fmt;
use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by the scanner
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Tile coordinates in the Web Mercator / Slippy Map system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a tile coordinate.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Canonical `x-y-z` key used for lookups and request correlation.
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.x, self.y, self.zoom)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.x, self.y, self.zoom)
    }
}

/// Geographic bounding box in degrees.
///
/// The two corners are `(lat_min, lon_min)` and `(lat_max, lon_max)`. Nothing
/// requires `lat_min < lat_max`; [`TileBounds::from_geo`] normalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl GeoBoundingBox {
    /// Creates a bounding box from `(lat_min, lon_min, lat_max, lon_max)`.
    pub fn new(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
        }
    }

    /// Checks both corners against the Web Mercator limits.
    pub fn validate(&self) -> Result<(), CoordError> {
        for lat in [self.lat_min, self.lat_max] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [self.lon_min, self.lon_max] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        Ok(())
    }
}

impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) .. ({}, {})",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

/// Inclusive rectangle of tile indices at one zoom level.
///
/// Constructors always normalize so that `min_x <= max_x` and
/// `min_y <= max_y`. The fields are public; a hand-built value with an
/// inverted axis counts as a single column or row on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub zoom: u8,
}

impl TileBounds {
    /// Builds bounds spanning two corner tiles.
    ///
    /// Projection does not preserve corner order (latitude grows north while
    /// tile Y grows south), so min/max are taken per axis.
    pub fn from_corners(a: TileCoord, b: TileCoord) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
            zoom: a.zoom,
        }
    }

    /// Number of tile columns (inclusive).
    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x).saturating_add(1)
    }

    /// Number of tile rows (inclusive).
    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y).saturating_add(1)
    }

    /// Total number of tiles in the rectangle.
    pub fn tile_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Returns true if the tile lies inside these bounds at the same zoom.
    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Iterates every tile, column by column (all `y` for `min_x`, then the next `x`).
    pub fn tiles(&self) -> TileBoundsIter {
        TileBoundsIter {
            bounds: *self,
            current: 0,
            total: self.tile_count(),
        }
    }
}

impl fmt::Display for TileBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x {}..={}, y {}..={} @ z{}",
            self.min_x, self.max_x, self.min_y, self.max_y, self.zoom
        )
    }
}

/// Iterator over all tiles in a [`TileBounds`].
#[derive(Debug, Clone)]
pub struct TileBoundsIter {
    bounds: TileBounds,
    current: usize,
    total: usize,
}

impl Iterator for TileBoundsIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }

        let height = self.bounds.height() as usize;
        let x = self.bounds.min_x + (self.current / height) as u32;
        let y = self.bounds.min_y + (self.current % height) as u32;

        self.current += 1;

        Some(TileCoord::new(x, y, self.bounds.zoom))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileBoundsIter {}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside valid range
    #[error("Invalid latitude: {0} (must be between {} and {})", MIN_LAT, MAX_LAT)]
    InvalidLatitude(f64),
    /// Longitude is outside valid range
    #[error("Invalid longitude: {0} (must be between {} and {})", MIN_LON, MAX_LON)]
    InvalidLongitude(f64),
    /// Zoom level is outside valid range
    #[error("Invalid zoom level: {0} (must be between {} and {})", MIN_ZOOM, MAX_ZOOM)]
    InvalidZoom(u8),
}
