//! On-disk layout of a batch.
//!
//! ```text
//! output_dir/
//! └── 2024-05-01T12-00-00Z/
//!     ├── manifest.json
//!     ├── stitched.png
//!     └── <x>/<y>.png
//! ```

use crate::codec::{self, CodecError};
use crate::fetch::FetchedTile;
use crate::tile_map::StitchError;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// `strftime` format of batch directory names.
pub const BATCH_DIR_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

/// File name of the composite image.
pub const STITCHED_FILE: &str = "stitched.png";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Encode(#[from] CodecError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error("output task failed: {0}")]
    Task(String),
}

/// Directory name for a batch started at `timestamp`.
pub fn batch_dir_name(timestamp: DateTime<Utc>) -> String {
    timestamp.format(BATCH_DIR_FORMAT).to_string()
}

/// Writes a tile to `batch_dir/<x>/<y>.png`, creating the column directory.
pub fn write_tile(batch_dir: &Path, tile: &FetchedTile) -> Result<PathBuf, OutputError> {
    let column = batch_dir.join(tile.coord.x.to_string());
    std::fs::create_dir_all(&column).map_err(|source| OutputError::CreateDir {
        path: column.clone(),
        source,
    })?;

    let path = batch_dir.join(tile.relative_filename());
    write_png(&path, &tile.image)?;
    Ok(path)
}

/// Encodes `image` as PNG and writes it to `path`.
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<(), OutputError> {
    let bytes = codec::encode_png(image)?;
    std::fs::write(path, bytes).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
