//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation and
//! Ctrl+C handling so command handlers stay short.

use crate::error::CliError;
use std::path::Path;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tilescan::config::ConfigFile;
use tilescan::logging::{init_logging, LoggingGuard};

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load the config at `config_path` and initialize logging.
    ///
    /// The config is read first because it names the log file.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables trace-level logging regardless of RUST_LOG
    pub fn new(config_path: &Path, debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(config_path)?;

        let logging_guard = init_logging(&config.logging.file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("tilescan v{}", tilescan::VERSION);
        info!("tilescan CLI: {} command", command);
    }

    /// Build the multi-threaded runtime the scanner runs on.
    pub fn build_runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tilescan")
            .build()
            .map_err(CliError::Runtime)
    }

    /// Returns a token that is cancelled on Ctrl+C.
    pub fn shutdown_on_ctrl_c(&self) -> Result<CancellationToken, CliError> {
        let shutdown = CancellationToken::new();
        let handler_token = shutdown.clone();

        ctrlc::set_handler(move || {
            info!("Interrupt received, finishing current batch");
            handler_token.cancel();
        })
        .map_err(|e| CliError::SignalHandler(e.to_string()))?;

        Ok(shutdown)
    }
}
