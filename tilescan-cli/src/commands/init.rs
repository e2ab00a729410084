//! Init command - write a default configuration file.

use std::path::Path;

use tilescan::config::ConfigFile;

use crate::error::CliError;

/// Run the init command.
///
/// An existing file is left untouched.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    if ConfigFile::ensure_exists(config_path)? {
        println!("Created {}", config_path.display());
        println!();
        println!("Set these before running 'tilescan start':");
        println!("  [scanner] bbox");
        println!("  [server]  tile_server");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }
    Ok(())
}
