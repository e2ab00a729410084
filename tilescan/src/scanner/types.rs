//! Scanner configuration, batch reports and errors.

use crate::coord::{CoordError, GeoBoundingBox, MAX_ZOOM};
use chrono::{DateTime, Utc};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default time between batches.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Shortest time between batches. Batch directories are named to the second,
/// so two batches inside one second would share a directory.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What to scan and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// Geographic area to cover.
    pub bbox: GeoBoundingBox,
    pub zoom: u8,
    /// Time between the start of consecutive batches.
    pub interval: Duration,
    /// Root under which one directory per batch is created.
    pub output_dir: PathBuf,
    /// Compose all tiles of a batch into `stitched.png`.
    pub stitch: bool,
}

impl ScannerConfig {
    pub fn new(bbox: GeoBoundingBox, zoom: u8, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            bbox,
            zoom,
            interval: DEFAULT_INTERVAL,
            output_dir: output_dir.into(),
            stitch: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_stitch(mut self, stitch: bool) -> Self {
        self.stitch = stitch;
        self
    }

    /// Checks the area, zoom level and interval.
    pub fn validate(&self) -> Result<(), ScanError> {
        self.bbox.validate()?;
        if self.zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(self.zoom).into());
        }
        if self.interval < MIN_INTERVAL {
            return Err(ScanError::InvalidInterval);
        }
        Ok(())
    }
}

/// Summary of one completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub timestamp: DateTime<Utc>,
    /// `output_dir/<timestamp>`
    pub directory: PathBuf,
    /// Cells in the grid.
    pub tile_count: usize,
    /// Tiles that arrived with real imagery.
    pub fetched: usize,
    /// Tiles replaced by the placeholder.
    pub failed: usize,
    pub files_written: usize,
    pub manifest_path: Option<PathBuf>,
    pub stitched_path: Option<PathBuf>,
}

/// Errors that stop the scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan area: {0}")]
    InvalidArea(#[from] CoordError),

    #[error("scan interval must be at least one second")]
    InvalidInterval,

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
