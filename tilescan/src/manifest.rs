//! Batch manifest.
//!
//! Every batch directory gets a `manifest.json` describing each requested
//! tile: where it came from, where it was written, and how the request went.
//! Records are appended concurrently through [`BatchManifest`] and frozen into
//! a [`Manifest`] once the batch barrier has passed.
//!
//! The file is tab-indented JSON:
//!
//! ```text
//! {
//!     "generator": { "version": "0.1.0", "program": "tilescan" },
//!     "timestamp": "2024-05-01T12:00:00Z",
//!     "tileCount": 4,
//!     "tiles": [
//!         {
//!             "url": "https://tiles.example.com/11/1818/806.png",
//!             "filename": "1818/806.png",
//!             "lastModified": "1970-01-01T00:00:00Z",
//!             "requestSentAt": "...",
//!             "receivedAt": "...",
//!             "httpStatusCode": 200
//!         }
//!     ]
//! }
//! ```

use crate::fetch::FetchedTile;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest inside a batch directory.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("tile file {0} is already recorded in this batch")]
    Duplicate(String),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Identifies the program that produced a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub version: String,
    pub program: String,
}

impl Default for GeneratorInfo {
    fn default() -> Self {
        Self {
            version: crate::VERSION.to_string(),
            program: crate::PROGRAM_NAME.to_string(),
        }
    }
}

/// One tile entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRecord {
    pub url: String,
    /// Path relative to the batch directory.
    pub filename: String,
    /// Server's `Last-Modified`, or the Unix epoch when absent.
    pub last_modified: DateTime<Utc>,
    pub request_sent_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    /// HTTP status, 0 when no response was received.
    pub http_status_code: u16,
}

impl From<&FetchedTile> for TileRecord {
    fn from(tile: &FetchedTile) -> Self {
        Self {
            url: tile.url.clone(),
            filename: tile.relative_filename(),
            last_modified: tile.last_modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            request_sent_at: tile.requested_at,
            received_at: tile.received_at,
            http_status_code: tile.status.unwrap_or(0),
        }
    }
}

/// The frozen manifest of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generator: GeneratorInfo,
    pub timestamp: DateTime<Utc>,
    pub tile_count: usize,
    pub tiles: Vec<TileRecord>,
}

impl Manifest {
    /// Renders the manifest as tab-indented JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, ManifestError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        out.push(b'\n');
        Ok(out)
    }

    /// Writes `manifest.json` into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        let json = self.to_json()?;
        std::fs::write(&path, json).map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[derive(Debug, Default)]
struct Records {
    tiles: Vec<TileRecord>,
    filenames: HashSet<String>,
}

/// Append-only, thread-safe manifest builder for one batch.
#[derive(Debug)]
pub struct BatchManifest {
    timestamp: DateTime<Utc>,
    tile_count: usize,
    records: Mutex<Records>,
}

impl BatchManifest {
    pub fn new(timestamp: DateTime<Utc>, tile_count: usize) -> Self {
        Self {
            timestamp,
            tile_count,
            records: Mutex::new(Records::default()),
        }
    }

    /// Appends the record for a completed tile.
    ///
    /// Each tile file may be recorded once; a second record for the same
    /// filename is rejected.
    pub fn record(&self, tile: &FetchedTile) -> Result<(), ManifestError> {
        let record = TileRecord::from(tile);
        let mut records = self.records.lock();

        if !records.filenames.insert(record.filename.clone()) {
            return Err(ManifestError::Duplicate(record.filename));
        }
        records.tiles.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once every expected tile has a record.
    pub fn is_complete(&self) -> bool {
        self.len() == self.tile_count
    }

    /// Freezes the records collected so far into a [`Manifest`], ordered by filename.
    pub fn finish(&self) -> Manifest {
        let mut tiles = self.records.lock().tiles.clone();
        tiles.sort_by(|a, b| a.filename.cmp(&b.filename));

        Manifest {
            generator: GeneratorInfo::default(),
            timestamp: self.timestamp,
            tile_count: self.tile_count,
            tiles,
        }
    }
}
