//! tilescan - periodic slippy-map tile grid scanner
//!
//! This library fetches every tile covering a geographic bounding box from a
//! templated tile server, on a fixed schedule, and writes each batch to disk
//! with a JSON manifest and an optional stitched mosaic.
//!
//! # High-Level API
//!
//! ```ignore
//! use tilescan::fetch::{ReqwestClient, TileFetcher};
//! use tilescan::scanner::Scanner;
//!
//! let fetcher = TileFetcher::start(fetcher_config, ReqwestClient::new()?, logger.clone(), shutdown.clone());
//! let scanner = Scanner::new(scanner_config, fetcher, logger)?;
//!
//! // Runs one batch immediately, then one per interval until cancelled
//! scanner.run(shutdown).await?;
//! ```

pub mod codec;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod log;
pub mod logging;
pub mod manifest;
pub mod scanner;
pub mod tile_map;

/// Version of the tilescan library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Program name recorded in batch manifests.
pub const PROGRAM_NAME: &str = "tilescan";
