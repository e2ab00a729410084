//! Start command - scan the configured area on a schedule.

use std::path::PathBuf;
use std::sync::Arc;

use tilescan::config::format_duration;
use tilescan::fetch::{ReqwestClient, TileFetcher};
use tilescan::log::{Logger, TracingLogger};
use tilescan::scanner::{BatchReport, Scanner};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the start command.
pub struct StartArgs {
    pub config: PathBuf,
    pub debug: bool,
    pub once: bool,
}

/// Run the start command.
pub fn run(args: StartArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(&args.config, args.debug)?;
    runner.log_startup("start");
    let config = runner.config();

    let scanner_config = config.scanner_config()?;
    let fetcher_config = config.fetcher_config()?;

    // Print banner
    println!("tilescan v{}", tilescan::VERSION);
    println!("================================");
    println!();
    println!("Area:        {}", scanner_config.bbox);
    println!("Zoom:        {}", scanner_config.zoom);
    println!("Tile server: {}", fetcher_config.url_template());
    println!("Output:      {}", scanner_config.output_dir.display());
    println!("Concurrency: {}", fetcher_config.max_concurrent());
    if args.once {
        println!("Mode:        single batch");
    } else {
        println!("Frequency:   {}", format_duration(scanner_config.interval));
    }
    println!();

    let runtime = runner.build_runtime()?;
    let shutdown = runner.shutdown_on_ctrl_c()?;

    if !args.once {
        println!("Press Ctrl+C to stop after the current batch");
        println!();
    }

    runtime.block_on(async move {
        let client = ReqwestClient::with_timeout(fetcher_config.request_timeout())
            .map_err(CliError::HttpClient)?;
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

        // Ctrl+C stops the schedule; the fetcher keeps serving the batch in
        // progress and is stopped only once the scanner returns.
        let fetcher_shutdown = CancellationToken::new();
        let fetcher = TileFetcher::start(
            fetcher_config,
            client,
            logger.clone(),
            fetcher_shutdown.clone(),
        );
        let scanner = Scanner::new(scanner_config, fetcher, logger)?;

        let result = if args.once {
            scanner.run_once().await.map(|report| print_report(&report))
        } else {
            scanner.run(shutdown).await
        };

        fetcher_shutdown.cancel();
        result.map_err(CliError::from)
    })?;

    println!("Scanner stopped.");
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("Batch {}", report.directory.display());
    println!(
        "  Tiles:  {} ({} fetched, {} failed)",
        report.tile_count, report.fetched, report.failed
    );
    println!("  Files:  {}", report.files_written);
    if let Some(manifest) = &report.manifest_path {
        println!("  Manifest: {}", manifest.display());
    }
    if let Some(stitched) = &report.stitched_path {
        println!("  Stitched: {}", stitched.display());
    }
}
