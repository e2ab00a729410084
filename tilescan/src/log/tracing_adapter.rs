//! Tracing library adapter implementation.

use crate::log::{Field, LogLevel, Logger};
use std::fmt::Write;

/// Logger implementation that delegates to the `tracing` crate.
///
/// Fields are appended to the message as `key=value` pairs, since `tracing`
/// field names must be known at compile time.
///
/// # Example
///
/// ```ignore
/// use tilescan::log::{Logger, TracingLogger};
/// use std::sync::Arc;
///
/// // Assumes tracing subscriber is already initialized
/// let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
/// logger.info("Using tracing backend", &[]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new tracing logger adapter.
    pub fn new() -> Self {
        Self
    }
}

fn render(message: &str, fields: &[Field<'_>]) -> String {
    let mut line = String::from(message);
    for (key, value) in fields {
        let _ = write!(line, " {}={}", key, value);
    }
    line
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, fields: &[Field<'_>]) {
        let line = render(message, fields);
        match level {
            LogLevel::Trace => tracing::trace!("{}", line),
            LogLevel::Debug => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Warn => tracing::warn!("{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }
    }
}
