//! Configuration for tilescan.
//!
//! Settings are read from an INI file (`tilescan.ini` by default) with three
//! sections: `[scanner]`, `[server]` and `[logging]`. Keys that are absent take
//! their defaults; `scanner.bbox` and `server.tile_server` have none and must
//! be set before a scan can start.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tilescan::config::ConfigFile;
//!
//! let config = ConfigFile::load_from(Path::new("tilescan.ini"))?;
//! let scanner = config.scanner_config()?;
//! let fetcher = config.fetcher_config()?;
//! # Ok::<(), tilescan::config::ConfigFileError>(())
//! ```

mod defaults;
mod duration;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use file::ConfigFileError;
pub use settings::{ConfigFile, LoggingSettings, ScannerSettings, ServerSettings};
