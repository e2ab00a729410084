//! One batch: fan out a fetch per grid cell, then write the manifest and the
//! stitched image.

use super::output::{self, OutputError, STITCHED_FILE};
use super::types::BatchReport;
use crate::coord::{TileBounds, TileCoord};
use crate::fetch::{AsyncHttpClient, FetchError, FetchedTile, TileFetcher};
use crate::log::Logger;
use crate::manifest::BatchManifest;
use crate::tile_map::TileMap;
use crate::{log_debug, log_error, log_info, log_warn};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// State shared by every cell task of a batch.
struct BatchContext<C> {
    fetcher: TileFetcher<C>,
    logger: Arc<dyn Logger>,
    directory: PathBuf,
    tile_map: Arc<TileMap>,
    manifest: BatchManifest,
}

/// What happened to one cell.
#[derive(Debug, Clone, Copy, Default)]
struct CellOutcome {
    fetched: bool,
    written: bool,
}

pub(super) async fn execute<C: AsyncHttpClient + 'static>(
    fetcher: &TileFetcher<C>,
    logger: &Arc<dyn Logger>,
    bounds: TileBounds,
    output_dir: &Path,
    timestamp: DateTime<Utc>,
    stitch: bool,
) -> BatchReport {
    let directory = output_dir.join(output::batch_dir_name(timestamp));
    let tile_count = bounds.tile_count();

    log_info!(
        logger,
        "Batch starting",
        bounds = bounds,
        tiles = tile_count,
        directory = directory.display()
    );

    if let Err(e) = tokio::fs::create_dir_all(&directory).await {
        log_error!(
            logger,
            "Failed to create batch directory",
            directory = directory.display(),
            error = e
        );
    }

    let ctx = Arc::new(BatchContext {
        fetcher: fetcher.clone(),
        logger: Arc::clone(logger),
        directory: directory.clone(),
        tile_map: Arc::new(TileMap::new(fetcher.config().tile_size())),
        manifest: BatchManifest::new(timestamp, tile_count),
    });

    let mut cells = JoinSet::new();
    for coord in bounds.tiles() {
        cells.spawn(process_cell(Arc::clone(&ctx), coord));
    }

    let mut fetched = 0;
    let mut files_written = 0;
    while let Some(result) = cells.join_next().await {
        match result {
            Ok(outcome) => {
                fetched += usize::from(outcome.fetched);
                files_written += usize::from(outcome.written);
            }
            Err(e) => {
                log_error!(logger, "Tile task panicked", error = e);
            }
        }
    }

    let recorded = ctx.manifest.len();
    if !ctx.manifest.is_complete() {
        log_warn!(
            logger,
            "Manifest is missing tiles",
            expected = tile_count,
            recorded = recorded
        );
    }

    let manifest = ctx.manifest.finish();
    let target = directory.clone();
    let manifest_path = match tokio::task::spawn_blocking(move || manifest.write_to(&target)).await
    {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) => {
            log_error!(logger, "Failed to write manifest", error = e);
            None
        }
        Err(e) => {
            log_error!(logger, "Manifest write task failed", error = e);
            None
        }
    };

    let stitched_path = if stitch {
        stitch_batch(logger, Arc::clone(&ctx.tile_map), bounds, &directory).await
    } else {
        None
    };

    let report = BatchReport {
        timestamp,
        directory,
        tile_count,
        fetched,
        failed: recorded - fetched.min(recorded),
        files_written,
        manifest_path,
        stitched_path,
    };

    log_info!(
        logger,
        "Batch complete",
        tiles = report.tile_count,
        fetched = report.fetched,
        failed = report.failed,
        files = report.files_written,
        directory = report.directory.display()
    );

    report
}

/// Fetch, write, store and record a single cell.
async fn process_cell<C: AsyncHttpClient + 'static>(
    ctx: Arc<BatchContext<C>>,
    coord: TileCoord,
) -> CellOutcome {
    let tile = match ctx.fetcher.submit(coord).await {
        Ok(tile) => tile,
        Err(e) => {
            log_error!(ctx.logger, "Tile request rejected", tile = coord, error = e);
            FetchedTile::placeholder(
                coord,
                ctx.fetcher.url_for(&coord),
                ctx.fetcher.config().tile_size(),
                FetchError::Rejected(e),
            )
        }
    };

    let directory = ctx.directory.clone();
    let written = tokio::task::spawn_blocking(move || {
        let result = output::write_tile(&directory, &tile);
        (tile, result)
    })
    .await;

    settle_cell(&ctx, coord, written)
}

/// Logs the write outcome, then records and stores the tile.
///
/// A cell always ends up in the manifest and the map, even when its write
/// task died and took the tile with it.
fn settle_cell<C>(
    ctx: &BatchContext<C>,
    coord: TileCoord,
    written: Result<(FetchedTile, Result<PathBuf, OutputError>), JoinError>,
) -> CellOutcome {
    let (tile, written) = match written {
        Ok((tile, Ok(path))) => {
            log_debug!(ctx.logger, "Tile written", tile = coord, path = path.display());
            (tile, true)
        }
        Ok((tile, Err(e))) => {
            log_error!(ctx.logger, "Failed to write tile", tile = coord, error = e);
            (tile, false)
        }
        Err(e) => {
            log_error!(ctx.logger, "Tile write task failed", tile = coord, error = e);
            let placeholder = FetchedTile::placeholder(
                coord,
                ctx.fetcher.url_for(&coord),
                ctx.fetcher.config().tile_size(),
                FetchError::Internal(e.to_string()),
            );
            (placeholder, false)
        }
    };

    let fetched = !tile.is_placeholder();

    if let Err(e) = ctx.manifest.record(&tile) {
        log_error!(ctx.logger, "Failed to record tile", tile = coord, error = e);
    }

    if ctx.tile_map.insert(tile).is_some() {
        log_error!(ctx.logger, "Tile stored twice in one batch", tile = coord);
    }

    CellOutcome { fetched, written }
}

/// Composes the grid and writes `stitched.png`. Failures are logged.
async fn stitch_batch(
    logger: &Arc<dyn Logger>,
    tile_map: Arc<TileMap>,
    bounds: TileBounds,
    directory: &Path,
) -> Option<PathBuf> {
    let path = directory.join(STITCHED_FILE);
    let target = path.clone();

    let result = tokio::task::spawn_blocking(move || -> Result<(u32, u32), OutputError> {
        let image = tile_map.stitch(&bounds)?;
        output::write_png(&target, &image)?;
        Ok(image.dimensions())
    })
    .await
    .map_err(|e| OutputError::Task(e.to_string()))
    .and_then(|r| r);

    match result {
        Ok((width, height)) => {
            log_info!(
                logger,
                "Stitched image written",
                path = path.display(),
                width = width,
                height = height
            );
            Some(path)
        }
        Err(e) => {
            log_error!(logger, "Failed to stitch tiles", error = e);
            None
        }
    }
}
