//! Bounded-concurrency tile acquisition.
//!
//! [`TileFetcher`] accepts coordinate requests from any number of tasks,
//! runs at most `max_concurrent` HTTP calls at a time through an
//! [`AdmissionGate`], and routes each reply back to the task that asked for
//! it. Failed fetches resolve to a transparent placeholder tile carrying the
//! error, so callers always receive an image.

mod fetcher;
mod gate;
mod http;
mod template;
mod types;

pub use fetcher::TileFetcher;
pub use gate::{AdmissionGate, AdmissionPermit, GateClosed};
pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient};
pub use template::{TemplateError, TileUrlTemplate};
pub use types::{
    FetchError, FetchedTile, FetcherConfig, FetcherStats, SubmitError, DEFAULT_MAX_CONCURRENT,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TILE_SIZE, DEFAULT_USER_AGENT,
};

#[cfg(test)]
pub use http::tests::{png_tile, MockResponse, MockTileServer, RecordedRequest};
