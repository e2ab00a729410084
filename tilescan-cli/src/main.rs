//! tilescan CLI - Command-line interface
//!
//! This binary provides a command-line interface to the tilescan library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tilescan::config::DEFAULT_CONFIG_FILE;

use commands::start::StartArgs;

#[derive(Parser)]
#[command(name = "tilescan")]
#[command(version = tilescan::VERSION)]
#[command(about = "Periodically download a slippy-map tile grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the configured area once per interval until interrupted
    Start {
        /// Path to the configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Enable trace-level logging
        #[arg(long)]
        debug: bool,

        /// Run a single batch and exit
        #[arg(long)]
        once: bool,
    },

    /// Write a configuration file with default settings
    Init {
        /// Path to the configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Show the tile grid covering the configured area
    Bounds {
        /// Path to the configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start {
            config,
            debug,
            once,
        } => commands::start::run(StartArgs {
            config,
            debug,
            once,
        }),
        Commands::Init { config } => commands::init::run(&config),
        Commands::Bounds { config } => commands::bounds::run(&config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
