//! Bounds command - show the tile grid a scan would cover.

use std::path::Path;

use tilescan::config::ConfigFile;
use tilescan::coord::{TileBounds, TileCoord};
use tilescan::fetch::TileUrlTemplate;
use tilescan::scanner::ScanError;

use crate::error::CliError;

/// Run the bounds command.
///
/// Needs only `[scanner] bbox`; the tile server is shown when configured.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(config_path)?;
    let scanner = config.scanner_config()?;
    let bounds =
        TileBounds::from_geo(&scanner.bbox, scanner.zoom).map_err(ScanError::InvalidArea)?;

    let tile_size = u64::from(config.server.tile_size);

    println!("Area:    {}", scanner.bbox);
    println!("Zoom:    {}", bounds.zoom);
    println!("Columns: x {}..={} ({})", bounds.min_x, bounds.max_x, bounds.width());
    println!("Rows:    y {}..={} ({})", bounds.min_y, bounds.max_y, bounds.height());
    println!("Tiles:   {}", bounds.tile_count());
    if scanner.stitch {
        println!(
            "Mosaic:  {} x {} px",
            u64::from(bounds.width()) * tile_size,
            u64::from(bounds.height()) * tile_size
        );
    }

    if let Some(template) = config
        .server
        .tile_server
        .as_deref()
        .and_then(|t| TileUrlTemplate::new(t).ok())
    {
        let first = TileCoord::new(bounds.min_x, bounds.min_y, bounds.zoom);
        println!("First:   {}", template.url_for(&first));
    }

    Ok(())
}
