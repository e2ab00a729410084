//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;
use std::time::Duration;

use super::settings::*;
use crate::fetch;
use crate::scanner;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tilescan.ini";

pub const DEFAULT_ZOOM_LEVEL: u8 = 11;
pub const DEFAULT_FREQUENCY: Duration = scanner::DEFAULT_INTERVAL;
pub const DEFAULT_OUTPUT_DIR: &str = "tiles";
pub const DEFAULT_STITCH_TILES: bool = false;

pub const DEFAULT_USER_AGENT: &str = fetch::DEFAULT_USER_AGENT;
pub const DEFAULT_MAX_CONCURRENCY: usize = fetch::DEFAULT_MAX_CONCURRENT;
pub const DEFAULT_TILE_SIZE: u32 = fetch::DEFAULT_TILE_SIZE;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = fetch::DEFAULT_REQUEST_TIMEOUT;

pub const DEFAULT_LOG_FILE: &str = "logs/tilescan.log";

/// Path of the config file used when none is given on the command line.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            scanner: ScannerSettings {
                bbox: None,
                zoom_level: DEFAULT_ZOOM_LEVEL,
                frequency: DEFAULT_FREQUENCY,
                output: PathBuf::from(DEFAULT_OUTPUT_DIR),
                stitch_tiles: DEFAULT_STITCH_TILES,
            },
            server: ServerSettings {
                tile_server: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                max_concurrency: DEFAULT_MAX_CONCURRENCY,
                tile_size: DEFAULT_TILE_SIZE,
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            logging: LoggingSettings {
                file: PathBuf::from(DEFAULT_LOG_FILE),
            },
        }
    }
}
