//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilescan::config::ConfigFileError;
use tilescan::fetch::FetchError;
use tilescan::scanner::ScanError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(ConfigFileError),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to install the Ctrl+C handler
    SignalHandler(String),
    /// Failed to create the HTTP client
    HttpClient(FetchError),
    /// Scanner could not start or run
    Scan(ScanError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Config(ConfigFileError::NotFound(path)) => {
                eprintln!();
                eprintln!("Create a config file with defaults:");
                eprintln!("  tilescan init --config {}", path.display());
            }
            CliError::Config(ConfigFileError::MissingValue { .. }) => {
                eprintln!();
                eprintln!("Both of these must be set before scanning:");
                eprintln!("  [scanner] bbox = lat_min, lon_min, lat_max, lon_max");
                eprintln!("  [server]  tile_server = https://host/{{z}}/{{x}}/{{y}}.png");
            }
            CliError::Scan(ScanError::OutputDir { path, .. }) => {
                eprintln!();
                eprintln!(
                    "Check that '{}' is writable or change [scanner] output.",
                    path.display()
                );
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::SignalHandler(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Scan(e) => write!(f, "Scanner error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Scan(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        CliError::Scan(e)
    }
}
