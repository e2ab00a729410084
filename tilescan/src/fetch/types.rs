//! Fetch result and configuration types.

use crate::codec::{self, CodecError};
use crate::coord::TileCoord;
use crate::fetch::TileUrlTemplate;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use std::time::Duration;
use thiserror::Error;

/// Default User-Agent sent to the tile server.
pub const DEFAULT_USER_AGENT: &str = concat!("tilescan/", env!("CARGO_PKG_VERSION"));

/// Default number of simultaneous HTTP calls.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 1000;

/// Default deadline for a single HTTP call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the request queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Why a single tile could not be fetched.
///
/// These never escape `submit` as an `Err`; they travel inside
/// [`FetchedTile::error`] next to the placeholder image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("tile server answered HTTP {status}")]
    Status { status: u16 },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("tile body could not be decoded: {0}")]
    Decode(#[from] CodecError),

    #[error("tile is {width}x{height}, expected {expected}x{expected}")]
    UnexpectedTileSize {
        width: u32,
        height: u32,
        expected: u32,
    },

    /// The fetcher refused the request; set by callers that substitute a placeholder.
    #[error("request not accepted: {0}")]
    Rejected(#[from] SubmitError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Protocol faults raised by [`TileFetcher::submit`](super::TileFetcher::submit).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The key already has a pending request.
    #[error("tile {0} already has a pending request")]
    DuplicateRequest(String),

    /// The fetcher shut down before a reply was delivered.
    #[error("tile fetcher is closed")]
    Closed,
}

/// The outcome of one tile request.
///
/// `image` is always present. When `error` is set it holds the transparent
/// placeholder.
#[derive(Debug, Clone)]
pub struct FetchedTile {
    pub coord: TileCoord,
    pub image: RgbaImage,
    pub url: String,
    /// HTTP status, `None` when no response was received.
    pub status: Option<u16>,
    pub last_modified: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub error: Option<FetchError>,
}

impl FetchedTile {
    /// A placeholder result for a request that never produced an image.
    pub fn placeholder(
        coord: TileCoord,
        url: impl Into<String>,
        tile_size: u32,
        error: FetchError,
    ) -> Self {
        let now = Utc::now();
        Self {
            coord,
            image: codec::placeholder(tile_size),
            url: url.into(),
            status: None,
            last_modified: None,
            requested_at: now,
            received_at: now,
            error: Some(error),
        }
    }

    /// Returns true if the image was substituted because the fetch failed.
    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }

    /// Time between sending the request and receiving the reply.
    pub fn duration(&self) -> Duration {
        (self.received_at - self.requested_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Path of the tile file relative to the batch directory: `x/y.png`.
    pub fn relative_filename(&self) -> String {
        format!("{}/{}.png", self.coord.x, self.coord.y)
    }
}

/// Settings for a [`TileFetcher`](super::TileFetcher).
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    url_template: TileUrlTemplate,
    user_agent: String,
    max_concurrent: usize,
    tile_size: u32,
    request_timeout: Duration,
    queue_capacity: usize,
}

impl FetcherConfig {
    pub fn new(url_template: TileUrlTemplate) -> Self {
        Self {
            url_template,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            tile_size: DEFAULT_TILE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the admission cap. Values below 1 are raised to 1.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn url_template(&self) -> &TileUrlTemplate {
        &self.url_template
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

/// Counters describing fetcher activity since start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetcherStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
}
