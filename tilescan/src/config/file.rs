//! Configuration file handling for tilescan.ini.
//!
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;
use crate::fetch::{FetcherConfig, TileUrlTemplate};
use crate::scanner::ScannerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Config file does not exist
    #[error("Config file not found: {0} (run 'tilescan init' to create one)")]
    NotFound(PathBuf),

    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A required value is absent
    #[error("Missing configuration: {section}.{key} must be set")]
    MissingValue { section: String, key: String },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from a specific path.
    ///
    /// Keys missing from the file take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create a config file with defaults if none exists at `path`.
    ///
    /// Returns true if a new file was written.
    pub fn ensure_exists(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Scanner settings, requiring a bounding box.
    pub fn scanner_config(&self) -> Result<ScannerConfig, ConfigFileError> {
        let bbox = self.scanner.bbox.ok_or_else(|| ConfigFileError::MissingValue {
            section: "scanner".to_string(),
            key: "bbox".to_string(),
        })?;

        Ok(
            ScannerConfig::new(bbox, self.scanner.zoom_level, self.scanner.output.clone())
                .with_interval(self.scanner.frequency)
                .with_stitch(self.scanner.stitch_tiles),
        )
    }

    /// Fetcher settings, requiring a tile server template.
    pub fn fetcher_config(&self) -> Result<FetcherConfig, ConfigFileError> {
        let template = self
            .server
            .tile_server
            .as_deref()
            .ok_or_else(|| ConfigFileError::MissingValue {
                section: "server".to_string(),
                key: "tile_server".to_string(),
            })?;

        let template =
            TileUrlTemplate::new(template).map_err(|e| ConfigFileError::InvalidValue {
                section: "server".to_string(),
                key: "tile_server".to_string(),
                value: template.to_string(),
                reason: e.to_string(),
            })?;

        Ok(FetcherConfig::new(template)
            .with_user_agent(self.server.user_agent.clone())
            .with_max_concurrent(self.server.max_concurrency)
            .with_tile_size(self.server.tile_size)
            .with_request_timeout(self.server.request_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::coord::GeoBoundingBox;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.scanner.bbox.is_none());
        assert_eq!(config.scanner.zoom_level, DEFAULT_ZOOM_LEVEL);
        assert_eq!(config.scanner.frequency, DEFAULT_FREQUENCY);
        assert_eq!(config.server.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.server.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(config.logging.file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_load_nonexistent_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(p) if p == config_path));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("tilescan.ini");

        let mut config = ConfigFile::default();
        config.scanner.bbox = Some(GeoBoundingBox::new(35.6, 139.6, 35.8, 139.9));
        config.scanner.frequency = Duration::from_secs(90);
        config.scanner.stitch_tiles = true;
        config.server.tile_server = Some("https://t.example/{z}/{x}/{y}.png".to_string());
        config.server.max_concurrency = 16;
        config.server.request_timeout = Duration::from_millis(2500);
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ensure_exists_writes_defaults_once() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tilescan.ini");

        assert!(ConfigFile::ensure_exists(&config_path).unwrap());
        assert!(!ConfigFile::ensure_exists(&config_path).unwrap());

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_scanner_config_requires_bbox() {
        let err = ConfigFile::default().scanner_config().unwrap_err();
        assert!(matches!(err, ConfigFileError::MissingValue { ref key, .. } if key == "bbox"));
    }

    #[test]
    fn test_fetcher_config_requires_tile_server() {
        let err = ConfigFile::default().fetcher_config().unwrap_err();
        assert!(matches!(err, ConfigFileError::MissingValue { ref key, .. } if key == "tile_server"));
    }

    #[test]
    fn test_runtime_configs_carry_settings() {
        let mut config = ConfigFile::default();
        config.scanner.bbox = Some(GeoBoundingBox::new(1.0, 2.0, 3.0, 4.0));
        config.scanner.zoom_level = 9;
        config.scanner.stitch_tiles = true;
        config.server.tile_server = Some("http://t/{z}/{x}/{y}.png".to_string());
        config.server.user_agent = "ua/1".to_string();
        config.server.max_concurrency = 3;
        config.server.tile_size = 512;

        let scanner = config.scanner_config().unwrap();
        assert_eq!(scanner.zoom, 9);
        assert_eq!(scanner.interval, DEFAULT_FREQUENCY);
        assert!(scanner.stitch);

        let fetcher = config.fetcher_config().unwrap();
        assert_eq!(fetcher.url_template().as_str(), "http://t/{z}/{x}/{y}.png");
        assert_eq!(fetcher.user_agent(), "ua/1");
        assert_eq!(fetcher.max_concurrent(), 3);
        assert_eq!(fetcher.tile_size(), 512);
    }
}
