//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `tilescan.ini`.

use super::duration::format_duration;
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let bbox = config
        .scanner
        .bbox
        .map(|b| format!("{}, {}, {}, {}", b.lat_min, b.lon_min, b.lat_max, b.lon_max))
        .unwrap_or_default();
    let tile_server = config.server.tile_server.as_deref().unwrap_or("");

    format!(
        r#"[scanner]
; Area to scan in degrees: lat_min, lon_min, lat_max, lon_max (required)
; Example: bbox = 35.60, 139.60, 35.80, 139.90
bbox = {}
; Slippy-map zoom level (0-22)
zoom_level = {}
; Time between batches. Bare numbers are seconds.
; Supports: ms, s, m, h suffixes (e.g., 90s, 15m, 1h, 1h30m)
frequency = {}
; Root directory for batch output. Each batch gets a timestamped subdirectory.
output = {}
; Compose all tiles of a batch into stitched.png
stitch_tiles = {}

[server]
; Tile URL template (required). {{x}} and {{y}} are substituted, {{z}} when present.
; Example: tile_server = https://tiles.example.com/{{z}}/{{x}}/{{y}}.png
tile_server = {}
; User-Agent header sent with every request
user_agent = {}
; Maximum simultaneous HTTP requests
max_concurrency = {}
; Edge length of a tile in pixels. Tiles of any other size count as failures.
tile_size = {}
; Deadline for a single tile request
request_timeout = {}

[logging]
; Log file path. Cleared at the start of every run.
file = {}
"#,
        bbox,
        config.scanner.zoom_level,
        format_duration(config.scanner.frequency),
        config.scanner.output.display(),
        config.scanner.stitch_tiles,
        tile_server,
        config.server.user_agent,
        config.server.max_concurrency,
        config.server.tile_size,
        format_duration(config.server.request_timeout),
        config.logging.file.display(),
    )
}
