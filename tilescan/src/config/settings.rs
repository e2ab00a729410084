//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::coord::GeoBoundingBox;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from tilescan.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Scan area and batch settings
    pub scanner: ScannerSettings,
    /// Tile server settings
    pub server: ServerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[scanner]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerSettings {
    /// Area to scan. Required; there is no sensible default.
    pub bbox: Option<GeoBoundingBox>,
    /// Slippy-map zoom level
    pub zoom_level: u8,
    /// Time between batches
    pub frequency: Duration,
    /// Root directory for batch output
    pub output: PathBuf,
    /// Compose each batch into stitched.png
    pub stitch_tiles: bool,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// URL template with `{x}`, `{y}` and optionally `{z}`. Required.
    pub tile_server: Option<String>,
    /// Sent as the User-Agent header
    pub user_agent: String,
    /// Maximum simultaneous HTTP requests
    pub max_concurrency: usize,
    /// Edge length of a tile in pixels
    pub tile_size: u32,
    /// Deadline for a single HTTP request
    pub request_timeout: Duration,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
