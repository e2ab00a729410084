//! The tile fetcher: request queue, dispatcher and correlation table.
//!
//! ```text
//!  submit(coord) ──► pending[key] = oneshot::Sender
//!        │
//!        └──► mpsc queue ──► dispatcher ──► gate.acquire() ──► worker
//!                                                                │
//!  submit() resolves ◄── pending.remove(key).send(tile) ◄────────┘
//! ```
//!
//! Callers may submit from any number of tasks. Each call resolves only when
//! its own coordinate has been fetched or has permanently failed.

use super::gate::{AdmissionGate, AdmissionPermit};
use super::http::AsyncHttpClient;
use super::types::{FetchError, FetchedTile, FetcherConfig, FetcherStats, SubmitError};
use crate::codec;
use crate::coord::TileCoord;
use crate::log::Logger;
use crate::{log_debug, log_error, log_info, log_warn};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

struct Shared<C> {
    config: FetcherConfig,
    client: C,
    logger: Arc<dyn Logger>,
    gate: AdmissionGate,

    /// Correlation table: one reply channel per outstanding key.
    pending: Mutex<HashMap<String, oneshot::Sender<FetchedTile>>>,

    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Bounded-concurrency tile downloader.
///
/// Cloning is cheap; all clones share one queue, one admission gate and one
/// correlation table. The dispatcher stops when `shutdown` is cancelled or
/// every handle has been dropped.
pub struct TileFetcher<C> {
    shared: Arc<Shared<C>>,
    requests: mpsc::Sender<TileCoord>,
}

impl<C> Clone for TileFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            requests: self.requests.clone(),
        }
    }
}

impl<C: AsyncHttpClient + 'static> TileFetcher<C> {
    /// Starts the dispatcher task and returns a handle to it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(
        config: FetcherConfig,
        client: C,
        logger: Arc<dyn Logger>,
        shutdown: CancellationToken,
    ) -> Self {
        let (requests, queue) = mpsc::channel(config.queue_capacity());

        let shared = Arc::new(Shared {
            gate: AdmissionGate::new(config.max_concurrent()),
            config,
            client,
            logger,
            pending: Mutex::new(HashMap::new()),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });

        tokio::spawn(dispatch(Arc::clone(&shared), queue, shutdown));

        Self { shared, requests }
    }

    /// Requests one tile and waits for its outcome.
    ///
    /// Fetch failures are not errors here: they come back as a
    /// [`FetchedTile`] holding the placeholder image and the cause.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::DuplicateRequest`] if the same key is still pending.
    ///   The earlier request is unaffected.
    /// - [`SubmitError::Closed`] if the fetcher shuts down first.
    pub async fn submit(&self, coord: TileCoord) -> Result<FetchedTile, SubmitError> {
        // No await between registering and queueing: a future dropped there
        // would leave its entry behind for good.
        let slot = self
            .requests
            .reserve()
            .await
            .map_err(|_| SubmitError::Closed)?;

        let key = coord.key();
        let (reply, response) = oneshot::channel();

        let registered = match self.shared.pending.lock().entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(reply);
                true
            }
        };

        if !registered {
            log_error!(self.shared.logger, "Duplicate tile request rejected", tile = key);
            return Err(SubmitError::DuplicateRequest(key));
        }

        self.shared.submitted.fetch_add(1, Ordering::Relaxed);
        slot.send(coord);

        // The dispatcher clears the table after closing the queue, so an entry
        // registered after that point would never be answered.
        if self.requests.is_closed() {
            self.shared.pending.lock().remove(&key);
        }

        response.await.map_err(|_| SubmitError::Closed)
    }
}

impl<C> TileFetcher<C> {
    pub fn config(&self) -> &FetcherConfig {
        &self.shared.config
    }

    /// The URL a coordinate would be fetched from.
    pub fn url_for(&self, coord: &TileCoord) -> String {
        self.shared.config.url_template().url_for(coord)
    }

    /// Number of requests awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn stats(&self) -> FetcherStats {
        FetcherStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            completed: self.shared.completed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
            in_flight: self.shared.gate.in_flight(),
            peak_in_flight: self.shared.gate.peak_in_flight(),
        }
    }
}

impl<C> Shared<C> {
    /// Hands a finished tile to its waiter, removing the correlation entry.
    fn deliver(&self, tile: FetchedTile) {
        let key = tile.coord.key();
        let waiter = self.pending.lock().remove(&key);

        match waiter {
            Some(reply) => {
                if reply.send(tile).is_err() {
                    log_debug!(self.logger, "Tile requester went away", tile = key);
                }
            }
            None => {
                log_warn!(self.logger, "Reply for tile with no pending request", tile = key);
            }
        }
    }
}

/// Pulls requests off the queue, admitting one worker per gate permit.
async fn dispatch<C: AsyncHttpClient + 'static>(
    shared: Arc<Shared<C>>,
    mut queue: mpsc::Receiver<TileCoord>,
    shutdown: CancellationToken,
) {
    let mut workers = JoinSet::new();

    loop {
        let coord = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = queue.recv() => match next {
                Some(coord) => coord,
                None => break,
            },
        };

        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            permit = shared.gate.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        workers.spawn(fetch_one(Arc::clone(&shared), coord, permit));

        while let Some(result) = workers.try_join_next() {
            if let Err(e) = result {
                if e.is_panic() {
                    log_error!(shared.logger, "Tile worker panicked", error = e);
                }
            }
        }
    }

    queue.close();
    workers.abort_all();
    shared.gate.close();

    let abandoned = {
        let mut pending = shared.pending.lock();
        let count = pending.len();
        pending.clear();
        count
    };

    log_info!(shared.logger, "Tile fetcher stopped", abandoned = abandoned);
}

/// Performs one HTTP exchange and delivers the outcome.
async fn fetch_one<C: AsyncHttpClient>(
    shared: Arc<Shared<C>>,
    coord: TileCoord,
    permit: AdmissionPermit,
) {
    let config = &shared.config;
    let url = config.url_template().url_for(&coord);
    let key = coord.key();

    log_info!(shared.logger, "Fetching tile", url = url, tile = key);

    let headers = [("User-Agent", config.user_agent())];
    let requested_at = Utc::now();
    let outcome = tokio::time::timeout(
        config.request_timeout(),
        shared.client.get(&url, &headers),
    )
    .await;
    let received_at = Utc::now();
    drop(permit);

    let (result, status, last_modified) = match outcome {
        Err(_) => (Err(FetchError::Timeout(config.request_timeout())), None, None),
        Ok(Err(e)) => (Err(e), None, None),
        Ok(Ok(response)) => {
            let last_modified = parse_last_modified(response.last_modified.as_deref());
            let result = if response.status == 200 {
                decode_tile(response.body, config.tile_size()).await
            } else {
                Err(FetchError::Status {
                    status: response.status,
                })
            };
            (result, Some(response.status), last_modified)
        }
    };

    let (image, error) = match result {
        Ok(image) => (image, None),
        Err(e) => (codec::placeholder(config.tile_size()), Some(e)),
    };

    let tile = FetchedTile {
        coord,
        image,
        url,
        status,
        last_modified,
        requested_at,
        received_at,
        error,
    };

    shared.completed.fetch_add(1, Ordering::Relaxed);
    let duration_ms = tile.duration().as_millis();
    let status = tile.status.unwrap_or(0);

    match &tile.error {
        None => {
            log_debug!(
                shared.logger,
                "Tile fetched",
                tile = key,
                status = status,
                duration_ms = duration_ms
            );
        }
        Some(e) => {
            shared.failed.fetch_add(1, Ordering::Relaxed);
            log_warn!(
                shared.logger,
                "Tile fetch failed",
                tile = key,
                url = tile.url,
                status = status,
                duration_ms = duration_ms,
                error = e
            );
        }
    }

    shared.deliver(tile);
}

/// Decodes a tile body off the async runtime and checks its size.
async fn decode_tile(body: Vec<u8>, tile_size: u32) -> Result<RgbaImage, FetchError> {
    let image = tokio::task::spawn_blocking(move || codec::decode(&body))
        .await
        .map_err(|e| FetchError::Internal(format!("decode task failed: {}", e)))??;

    let (width, height) = image.dimensions();
    if width != tile_size || height != tile_size {
        return Err(FetchError::UnexpectedTileSize {
            width,
            height,
            expected: tile_size,
        });
    }

    Ok(image)
}

/// Parses an HTTP-date such as `Wed, 21 Oct 2015 07:28:00 GMT`.
fn parse_last_modified(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value?.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
