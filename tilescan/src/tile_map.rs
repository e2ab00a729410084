//! Per-batch tile grid and stitching.
//!
//! The map holds every tile of one batch, keyed by column then row. Once all
//! fetches are in, [`TileMap::stitch`] composes the grid into one image of
//! `width * tile_size` by `height * tile_size` pixels.

use crate::coord::{TileBounds, TileCoord};
use crate::fetch::FetchedTile;
use image::{imageops, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Largest stitched image, in bytes of RGBA pixels, [`TileMap::stitch`] will allocate.
pub const MAX_STITCH_BYTES: u64 = 1 << 30;

/// Errors raised while composing the grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StitchError {
    #[error("no tile stored for {0}")]
    MissingTile(TileCoord),

    #[error("tile {coord} is {width}x{height}, expected {expected}x{expected}")]
    TileSizeMismatch {
        coord: TileCoord,
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("stitched image of {columns}x{rows} tiles at {tile_size}px is too large")]
    TooLarge {
        columns: u32,
        rows: u32,
        tile_size: u32,
    },
}

/// Sparse `x -> (y -> tile)` grid for one batch.
#[derive(Debug)]
pub struct TileMap {
    tile_size: u32,
    grid: Mutex<HashMap<u32, HashMap<u32, FetchedTile>>>,
}

impl TileMap {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            grid: Mutex::new(HashMap::new()),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Stores a tile at its `(x, y)`, returning the tile it replaced, if any.
    pub fn insert(&self, tile: FetchedTile) -> Option<FetchedTile> {
        let (x, y) = (tile.coord.x, tile.coord.y);
        self.grid.lock().entry(x).or_default().insert(y, tile)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.grid
            .lock()
            .get(&x)
            .is_some_and(|column| column.contains_key(&y))
    }

    /// Clone of the tile at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<FetchedTile> {
        self.grid.lock().get(&x)?.get(&y).cloned()
    }

    pub fn len(&self) -> usize {
        self.grid.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Composes every tile within `bounds` into one image.
    ///
    /// Each tile is copied with an opaque overwrite at
    /// `((x - min_x) * tile_size, (y - min_y) * tile_size)`. Every cell must be
    /// present and exactly `tile_size` square.
    ///
    /// CPU heavy; call from a blocking context.
    pub fn stitch(&self, bounds: &TileBounds) -> Result<RgbaImage, StitchError> {
        let tile_size = self.tile_size;
        let too_large = || StitchError::TooLarge {
            columns: bounds.width(),
            rows: bounds.height(),
            tile_size,
        };
        let width = bounds.width().checked_mul(tile_size).ok_or_else(too_large)?;
        let height = bounds.height().checked_mul(tile_size).ok_or_else(too_large)?;
        let bytes = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(too_large)?;
        if bytes > MAX_STITCH_BYTES {
            return Err(too_large());
        }

        let grid = self.grid.lock();
        let mut canvas = RgbaImage::new(width, height);

        for coord in bounds.tiles() {
            let tile = grid
                .get(&coord.x)
                .and_then(|column| column.get(&coord.y))
                .ok_or(StitchError::MissingTile(coord))?;

            let (tile_width, tile_height) = tile.image.dimensions();
            if tile_width != tile_size || tile_height != tile_size {
                return Err(StitchError::TileSizeMismatch {
                    coord,
                    width: tile_width,
                    height: tile_height,
                    expected: tile_size,
                });
            }

            let x = i64::from((coord.x - bounds.min_x) * tile_size);
            let y = i64::from((coord.y - bounds.min_y) * tile_size);
            imageops::replace(&mut canvas, &tile.image, x, y);
        }

        Ok(canvas)
    }
}
