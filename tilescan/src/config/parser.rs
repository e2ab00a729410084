//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::time::Duration;

use super::duration::parse_duration;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{GeoBoundingBox, MAX_ZOOM};
use crate::fetch::TileUrlTemplate;
use crate::scanner::MIN_INTERVAL;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [scanner] section
    if let Some(section) = ini.section(Some("scanner")) {
        if let Some(v) = value(section.get("bbox")) {
            config.scanner.bbox = Some(parse_bbox(v)?);
        }
        if let Some(v) = value(section.get("zoom_level")) {
            config.scanner.zoom_level = v
                .parse::<u8>()
                .ok()
                .filter(|z| *z <= MAX_ZOOM)
                .ok_or_else(|| {
                    invalid(
                        "scanner",
                        "zoom_level",
                        v,
                        format!("must be an integer between 0 and {}", MAX_ZOOM),
                    )
                })?;
        }
        if let Some(v) = value(section.get("frequency")) {
            let frequency = positive_duration("scanner", "frequency", v)?;
            if frequency < MIN_INTERVAL {
                return Err(invalid("scanner", "frequency", v, "must be at least 1s"));
            }
            config.scanner.frequency = frequency;
        }
        if let Some(v) = value(section.get("output")) {
            config.scanner.output = PathBuf::from(v);
        }
        if let Some(v) = value(section.get("stitch_tiles")) {
            config.scanner.stitch_tiles = parse_bool(v)
                .ok_or_else(|| invalid("scanner", "stitch_tiles", v, "must be true or false"))?;
        }
    }

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = value(section.get("tile_server")) {
            TileUrlTemplate::new(v)
                .map_err(|e| invalid("server", "tile_server", v, e.to_string()))?;
            config.server.tile_server = Some(v.to_string());
        }
        if let Some(v) = value(section.get("user_agent")) {
            config.server.user_agent = v.to_string();
        }
        if let Some(v) = value(section.get("max_concurrency")) {
            config.server.max_concurrency = v
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    invalid("server", "max_concurrency", v, "must be a positive integer")
                })?;
        }
        if let Some(v) = value(section.get("tile_size")) {
            config.server.tile_size = v
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    invalid("server", "tile_size", v, "must be a positive integer (pixels)")
                })?;
        }
        if let Some(v) = value(section.get("request_timeout")) {
            config.server.request_timeout = positive_duration("server", "request_timeout", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = value(section.get("file")) {
            config.logging.file = PathBuf::from(v);
        }
    }

    Ok(config)
}

/// Trims a raw value, drops a trailing `; comment`, and treats empty as unset.
fn value(raw: Option<&str>) -> Option<&str> {
    let raw = raw?;
    let raw = match raw.find(" ;") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let raw = raw.trim();
    (!raw.is_empty()).then_some(raw)
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parses `lat_min, lon_min, lat_max, lon_max`.
fn parse_bbox(v: &str) -> Result<GeoBoundingBox, ConfigFileError> {
    const FORMAT: &str = "expected 'lat_min, lon_min, lat_max, lon_max' in degrees";

    let parts = v
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("scanner", "bbox", v, FORMAT))?;

    let &[lat_min, lon_min, lat_max, lon_max] = parts.as_slice() else {
        return Err(invalid("scanner", "bbox", v, FORMAT));
    };

    let bbox = GeoBoundingBox::new(lat_min, lon_min, lat_max, lon_max);
    bbox.validate()
        .map_err(|e| invalid("scanner", "bbox", v, e.to_string()))?;
    Ok(bbox)
}

fn positive_duration(section: &str, key: &str, v: &str) -> Result<Duration, ConfigFileError> {
    let duration = parse_duration(v).map_err(|e| invalid(section, key, v, e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid(section, key, v, "must be greater than zero"));
    }
    Ok(duration)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
