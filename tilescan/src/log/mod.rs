//! Logging abstraction layer.
//!
//! Decouples the fetcher and scanner from any concrete logging backend.
//! Components accept an `Arc<dyn Logger>` and emit structured events through
//! the `log_*!` macros:
//!
//! ```
//! use tilescan::log::{Logger, NoOpLogger};
//! use tilescan::log_info;
//! use std::sync::Arc;
//!
//! struct MyComponent {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl MyComponent {
//!     fn do_work(&self) {
//!         log_info!(self.logger, "Starting work", step = 1);
//!     }
//! }
//!
//! MyComponent { logger: Arc::new(NoOpLogger) }.do_work();
//! ```
//!
//! - `TracingLogger`: production adapter that delegates to `tracing`
//! - `NoOpLogger`: silent logger
//! - `RecordingLogger`: keeps events in memory for assertions

mod noop;
mod recording;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{Field, LogLevel, Logger};
pub use recording::{LogRecord, RecordingLogger};
pub use tracing_adapter::TracingLogger;
