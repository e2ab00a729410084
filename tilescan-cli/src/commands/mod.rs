//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`bounds`] - Print the tile grid for the configured area
//! - [`init`] - Configuration initialization
//! - [`start`] - Main command (periodic scan)

pub mod bounds;
pub mod init;
pub mod start;
