//! Periodic batch orchestrator.
//!
//! A [`Scanner`] turns the configured bounding box into a tile grid and,
//! once per interval, downloads every cell of it into a fresh timestamped
//! directory:
//!
//! 1. Project the bounding box to [`TileBounds`] at the configured zoom.
//! 2. Spawn one task per cell: submit to the fetcher, write `<x>/<y>.png`,
//!    store the tile in the batch's [`TileMap`](crate::tile_map::TileMap) and
//!    record it in the manifest.
//! 3. Wait for every cell, then write `manifest.json` and, if enabled,
//!    `stitched.png`.
//!
//! A failed tile never fails the batch: it is written and recorded as a
//! transparent placeholder. Only setup problems (invalid area, unusable
//! output directory) surface as [`ScanError`].

mod batch;
mod output;
mod types;

pub use output::{batch_dir_name, OutputError, BATCH_DIR_FORMAT, STITCHED_FILE};
pub use types::{BatchReport, ScanError, ScannerConfig, DEFAULT_INTERVAL, MIN_INTERVAL};

use crate::coord::TileBounds;
use crate::fetch::{AsyncHttpClient, TileFetcher};
use crate::log::Logger;
use crate::{log_error, log_info};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Downloads the configured grid on a fixed interval.
pub struct Scanner<C> {
    config: ScannerConfig,
    fetcher: TileFetcher<C>,
    logger: Arc<dyn Logger>,
}

impl<C: AsyncHttpClient + 'static> Scanner<C> {
    /// Creates a scanner, rejecting an invalid area, zoom or interval.
    pub fn new(
        config: ScannerConfig,
        fetcher: TileFetcher<C>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            logger,
        })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The tile rectangle covering the configured area.
    pub fn bounds(&self) -> Result<TileBounds, ScanError> {
        Ok(TileBounds::from_geo(&self.config.bbox, self.config.zoom)?)
    }

    /// Runs a batch now and then once per interval until `shutdown` fires.
    ///
    /// A batch in progress is finished before the loop exits. Missed ticks
    /// are skipped rather than run back to back.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::OutputDir`] if the output directory cannot be
    /// created. Nothing is fetched in that case.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ScanError> {
        self.prepare_output().await?;

        log_info!(
            self.logger,
            "Scanner starting",
            area = self.config.bbox,
            zoom = self.config.zoom,
            interval_secs = self.config.interval.as_secs(),
            output = self.config.output_dir.display()
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    log_info!(self.logger, "Scanner shutting down");
                    break;
                }

                _ = interval.tick() => {
                    if let Err(e) = self.run_batch().await {
                        log_error!(self.logger, "Batch failed", error = e);
                    }
                }
            }
        }

        Ok(())
    }

    /// Prepares the output directory and runs exactly one batch.
    pub async fn run_once(&self) -> Result<BatchReport, ScanError> {
        self.prepare_output().await?;
        self.run_batch().await
    }

    /// Runs one batch into `output_dir/<now>`.
    pub async fn run_batch(&self) -> Result<BatchReport, ScanError> {
        let bounds = self.bounds()?;
        let timestamp = Utc::now().trunc_subsecs(0);

        Ok(batch::execute(
            &self.fetcher,
            &self.logger,
            bounds,
            &self.config.output_dir,
            timestamp,
            self.config.stitch,
        )
        .await)
    }

    async fn prepare_output(&self) -> Result<(), ScanError> {
        let path = &self.config.output_dir;
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| ScanError::OutputDir {
                path: path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests;
